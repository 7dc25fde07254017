//! Coordinate and geometry types shared across the batcher.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Vector/matrix math comes from `glam`; `Affine2` carries the transform
//! stack and `Mat4` the projection handed to the matrix uniform.

pub mod angle;
mod corner_radii;
mod rect;

pub use corner_radii::CornerRadii;
pub use glam::{Affine2, Mat4, Vec2};
pub use rect::Rect;
