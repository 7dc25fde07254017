//! Sprite fonts: pre-rasterized glyphs with metrics and kerning.
//!
//! Building happens in two phases so the core stays GPU-free: `from_font`
//! rasterizes and shelf-packs a coverage atlas on the CPU, then the caller
//! uploads the atlas however it likes and binds it with `attach_atlas`.

use std::collections::HashMap;

use bitflags::bitflags;
use glam::Vec2;
use log::warn;

use crate::coords::Rect;
use crate::gfx::{Subtexture, TextureRef};

bitflags! {
    /// Text alignment relative to the draw position. An unset axis centers.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct TextAlign: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

impl TextAlign {
    pub const CENTER: TextAlign = TextAlign::empty();
    pub const TOP_LEFT: TextAlign = TextAlign::TOP.union(TextAlign::LEFT);
    pub const TOP_RIGHT: TextAlign = TextAlign::TOP.union(TextAlign::RIGHT);
    pub const BOTTOM_LEFT: TextAlign = TextAlign::BOTTOM.union(TextAlign::LEFT);
    pub const BOTTOM_RIGHT: TextAlign = TextAlign::BOTTOM.union(TextAlign::RIGHT);
}

/// One drawable character.
#[derive(Debug, Clone, Default)]
pub struct Glyph {
    /// Cursor advance in font units.
    pub advance: f32,
    /// Bitmap placement relative to the baseline cursor (+Y down).
    pub offset: Vec2,
    /// Atlas region, absent for whitespace-like glyphs.
    pub subtexture: Option<Subtexture>,
}

/// Rasterized font at a fixed pixel size.
///
/// `descent` is stored as a positive distance below the baseline, so
/// `height = ascent + descent`.
pub struct SpriteFont {
    pub size: f32,
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
    glyphs: HashMap<char, Glyph>,
    kerning: HashMap<(char, char), f32>,
}

impl SpriteFont {
    pub fn new(size: f32, ascent: f32, descent: f32, line_gap: f32) -> Self {
        Self {
            size,
            ascent,
            descent,
            line_gap,
            glyphs: HashMap::new(),
            kerning: HashMap::new(),
        }
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }

    #[inline]
    pub fn line_height(&self) -> f32 {
        self.height() + self.line_gap
    }

    pub fn set_glyph(&mut self, ch: char, glyph: Glyph) {
        self.glyphs.insert(ch, glyph);
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn set_kerning(&mut self, left: char, right: char, value: f32) {
        self.kerning.insert((left, right), value);
    }

    pub fn kerning(&self, left: char, right: char) -> f32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0.0)
    }

    /// Advance-sum width of `text` up to the first newline.
    pub fn width_of_line(&self, text: &str) -> f32 {
        let mut width = 0.0;
        for ch in text.chars() {
            if ch == '\n' {
                break;
            }
            if let Some(glyph) = self.glyphs.get(&ch) {
                width += glyph.advance;
            }
        }
        width
    }

    /// Width of the widest line.
    pub fn width_of(&self, text: &str) -> f32 {
        text.split('\n')
            .map(|line| self.width_of_line(line))
            .fold(0.0, f32::max)
    }

    /// Vertical extent of a text block: zero for empty text, otherwise one
    /// font height plus a line height per newline.
    pub fn height_of(&self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let newlines = text.chars().filter(|&c| c == '\n').count();
        self.height() + self.line_height() * newlines as f32
    }

    /// Rasterizes `charset` at `size` and shelf-packs a coverage atlas.
    ///
    /// Glyph subtextures stay unbound until [`attach_atlas`] is called with
    /// the uploaded texture.
    ///
    /// [`attach_atlas`]: SpriteFont::attach_atlas
    pub fn from_font(font: &fontdue::Font, size: f32, charset: &[char]) -> (SpriteFont, FontAtlas) {
        let (ascent, descent, line_gap) = match font.horizontal_line_metrics(size) {
            Some(m) => (m.ascent, -m.descent, m.line_gap),
            None => {
                warn!("font has no horizontal line metrics, using size {size} as ascent");
                (size, 0.0, 0.0)
            }
        };
        let mut sprite = SpriteFont::new(size, ascent, descent, line_gap);

        let mut packer = ShelfPacker::new(ATLAS_WIDTH, GLYPH_PADDING);
        let mut rasterized = Vec::new();

        for &ch in charset {
            let (metrics, bitmap) = font.rasterize(ch, size);

            let mut glyph = Glyph {
                advance: metrics.advance_width,
                offset: Vec2::new(
                    metrics.xmin as f32,
                    -(metrics.ymin as f32) - metrics.height as f32,
                ),
                subtexture: None,
            };

            if metrics.width > 0 && metrics.height > 0 {
                match packer.place(metrics.width as u32, metrics.height as u32) {
                    Some((x, y)) => {
                        rasterized.push((ch, x, y, metrics.width as u32, metrics.height as u32, bitmap));
                    }
                    None => {
                        warn!("glyph {ch:?} does not fit the atlas, dropping its bitmap");
                        glyph.offset = Vec2::ZERO;
                    }
                }
            }

            sprite.set_glyph(ch, glyph);
        }

        let height = packer.used_height().next_power_of_two().max(1);
        let mut atlas = FontAtlas {
            width: ATLAS_WIDTH,
            height,
            coverage: vec![0; (ATLAS_WIDTH * height) as usize],
            entries: Vec::with_capacity(rasterized.len()),
        };

        for (ch, x, y, w, h, bitmap) in rasterized {
            for row in 0..h {
                let src = (row * w) as usize;
                let dst = ((y + row) * atlas.width + x) as usize;
                atlas.coverage[dst..dst + w as usize]
                    .copy_from_slice(&bitmap[src..src + w as usize]);
            }
            atlas.entries.push((ch, Rect::new(x as f32, y as f32, w as f32, h as f32)));
        }

        // Pairwise kerning over the charset.
        for &left in charset {
            for &right in charset {
                if let Some(kern) = font.horizontal_kern(left, right, size) {
                    if kern != 0.0 {
                        sprite.set_kerning(left, right, kern);
                    }
                }
            }
        }

        (sprite, atlas)
    }

    /// Binds atlas regions to glyph subtextures once `texture` holds the
    /// uploaded atlas.
    pub fn attach_atlas(&mut self, atlas: &FontAtlas, texture: TextureRef) {
        for (ch, source) in &atlas.entries {
            if let Some(glyph) = self.glyphs.get_mut(ch) {
                let frame = Rect::new(0.0, 0.0, source.size.x, source.size.y);
                glyph.subtexture = Some(Subtexture::new(Some(texture.clone()), *source, frame));
            }
        }
    }
}

/// Printable ASCII, the usual starter charset.
pub fn ascii_charset() -> Vec<char> {
    (32u8..127).map(char::from).collect()
}

const ATLAS_WIDTH: u32 = 1024;
const GLYPH_PADDING: u32 = 1;

/// CPU-side glyph coverage atlas (one byte per pixel).
pub struct FontAtlas {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
    /// Packed source rectangle per character.
    pub entries: Vec<(char, Rect)>,
}

/// Left-to-right shelf packer.
struct ShelfPacker {
    width: u32,
    padding: u32,
    next_x: u32,
    next_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    fn new(width: u32, padding: u32) -> Self {
        Self { width, padding, next_x: padding, next_y: padding, row_height: 0 }
    }

    /// Top-left corner for a `w`x`h` region, or `None` when it can never
    /// fit the shelf width.
    fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w + self.padding * 2 > self.width {
            return None;
        }
        if self.next_x + w + self.padding > self.width {
            self.next_x = self.padding;
            self.next_y += self.row_height + self.padding;
            self.row_height = 0;
        }

        let pos = (self.next_x, self.next_y);
        self.next_x += w + self.padding;
        self.row_height = self.row_height.max(h);
        Some(pos)
    }

    fn used_height(&self) -> u32 {
        self.next_y + self.row_height + self.padding
    }
}
