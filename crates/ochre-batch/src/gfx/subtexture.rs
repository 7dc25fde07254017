use std::fmt;

use glam::Vec2;

use super::texture::TextureRef;
use crate::coords::Rect;

/// A sub-region of a texture with pre-baked draw and UV quads.
///
/// `source` is the pixel rectangle inside the texture. `frame` is the
/// logical bounds in local space; a non-zero (negative) frame origin encodes
/// transparent padding trimmed away by an atlas packer, so the source pixels
/// draw offset by `-frame.origin` inside the logical rectangle.
#[derive(Clone, Default)]
pub struct Subtexture {
    pub texture: Option<TextureRef>,
    pub source: Rect,
    pub frame: Rect,
    pub draw_coords: [Vec2; 4],
    pub tex_coords: [Vec2; 4],
}

impl Subtexture {
    pub fn new(texture: Option<TextureRef>, source: Rect, frame: Rect) -> Self {
        let mut sub = Self { texture, source, frame, ..Default::default() };
        sub.update();
        sub
    }

    /// Covers the whole texture with a matching frame.
    pub fn from_texture(texture: TextureRef) -> Self {
        let rect = Rect::new(0.0, 0.0, texture.width() as f32, texture.height() as f32);
        Self::new(Some(texture), rect, rect)
    }

    /// Logical width.
    #[inline]
    pub fn width(&self) -> f32 {
        self.frame.size.x
    }

    /// Logical height.
    #[inline]
    pub fn height(&self) -> f32 {
        self.frame.size.y
    }

    /// Recomputes the baked quads after `source`, `frame` or `texture`
    /// changed.
    pub fn update(&mut self) {
        let tl = -self.frame.origin;
        self.draw_coords = [
            tl,
            tl + Vec2::new(self.source.size.x, 0.0),
            tl + self.source.size,
            tl + Vec2::new(0.0, self.source.size.y),
        ];

        if let Some(texture) = &self.texture {
            let inv = Vec2::new(1.0 / texture.width() as f32, 1.0 / texture.height() as f32);
            let min = self.source.min() * inv;
            let max = self.source.max() * inv;
            self.tex_coords = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
        } else {
            self.tex_coords = [Vec2::ZERO; 4];
        }
    }

    /// New subtexture covering `clip`, expressed in this subtexture's local
    /// space. Source pixels are clamped to the available region; the frame
    /// keeps the clip's size so layout stays stable.
    pub fn crop(&self, clip: Rect) -> Subtexture {
        let in_source = clip.origin + self.frame.origin;

        let x0 = in_source.x.max(0.0);
        let y0 = in_source.y.max(0.0);
        let x1 = (in_source.x + clip.size.x).min(self.source.size.x);
        let y1 = (in_source.y + clip.size.y).min(self.source.size.y);

        let source = Rect::new(
            self.source.origin.x + x0,
            self.source.origin.y + y0,
            (x1 - x0).max(0.0),
            (y1 - y0).max(0.0),
        );
        let frame = Rect::new(in_source.x - x0, in_source.y - y0, clip.size.x, clip.size.y);

        Subtexture::new(self.texture.clone(), source, frame)
    }
}

// Texture handles are unsized trait objects, so report their dimensions
// instead of deriving.
impl fmt::Debug for Subtexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subtexture")
            .field("texture", &self.texture.as_ref().map(|t| (t.width(), t.height())))
            .field("source", &self.source)
            .field("frame", &self.frame)
            .finish()
    }
}
