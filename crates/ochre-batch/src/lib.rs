//! Backend-agnostic retained-geometry 2D batcher.
//!
//! Geometry emitters accumulate transformed vertices into shared buffers;
//! render-state changes split the stream into contiguous batches that a
//! [`gfx::RenderDevice`] implementation submits in painter's order.

pub mod batch;
pub mod buffer;
pub mod color;
pub mod coords;
pub mod font;
pub mod gfx;
pub mod stack;
pub mod vertex;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{Batcher, ColorMode, DrawBatch};
pub use color::Color;
pub use coords::{Affine2, CornerRadii, Mat4, Rect, Vec2};
pub use font::{Glyph, SpriteFont, TextAlign};
pub use gfx::{
    BatchDefaults, BlendMode, Material, MaterialRef, ParamMaterial, RenderDevice, RendererFeatures,
    Subtexture, TextureRef, TextureSampler,
};
pub use vertex::Vertex;
