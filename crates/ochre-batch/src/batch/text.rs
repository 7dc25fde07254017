//! Text runs drawn as per-glyph subtexture quads.

use glam::{Affine2, Vec2};

use super::Batcher;
use crate::color::Color;
use crate::font::{SpriteFont, TextAlign};

impl Batcher {
    /// Text at the font's native size, top-left aligned.
    pub fn text(&mut self, font: &SpriteFont, text: &str, pos: Vec2, color: Color) {
        self.text_aligned(font, text, pos, TextAlign::TOP_LEFT, font.size, color);
    }

    /// Multi-line text run. `size` rescales the font; alignment is applied
    /// per line horizontally and over the whole block vertically.
    pub fn text_aligned(
        &mut self,
        font: &SpriteFont,
        text: &str,
        pos: Vec2,
        align: TextAlign,
        size: f32,
        color: Color,
    ) {
        if text.is_empty() {
            return;
        }

        // Glyph quads are laid out in font units; the matrix applies the
        // requested size and position.
        let scale = size / font.size;
        self.push_matrix(Affine2::from_translation(pos) * Affine2::from_scale(Vec2::splat(scale)));

        let mut offset = Vec2::new(line_offset_x(font, text, align), block_offset_y(font, text, align));
        let mut last: Option<char> = None;

        for (i, ch) in text.char_indices() {
            if ch == '\n' {
                offset.x = line_offset_x(font, &text[i + 1..], align);
                offset.y += font.line_height();
                last = None;
                continue;
            }

            let Some(glyph) = font.glyph(ch) else {
                last = Some(ch);
                continue;
            };

            // Kerning nudges the drawn quad; the cursor advances by the
            // plain advance so runs stay in step with width_of_line.
            if let Some(sub) = &glyph.subtexture {
                let kern = last.map_or(0.0, |prev| font.kerning(prev, ch));
                self.subtex(sub, offset + glyph.offset + Vec2::new(kern, 0.0), color);
            }

            offset.x += glyph.advance;
            last = Some(ch);
        }

        self.pop_matrix();
    }
}

fn line_offset_x(font: &SpriteFont, line: &str, align: TextAlign) -> f32 {
    if align.contains(TextAlign::LEFT) {
        0.0
    } else if align.contains(TextAlign::RIGHT) {
        -font.width_of_line(line)
    } else {
        -font.width_of_line(line) * 0.5
    }
}

fn block_offset_y(font: &SpriteFont, text: &str, align: TextAlign) -> f32 {
    if align.contains(TextAlign::TOP) {
        font.ascent + font.descent
    } else if align.contains(TextAlign::BOTTOM) {
        font.height() - font.height_of(text)
    } else {
        font.ascent + font.descent - font.height_of(text) * 0.5
    }
}
