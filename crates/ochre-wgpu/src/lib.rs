//! wgpu execution backend for `ochre-batch`.
//!
//! [`BatchRenderer`] owns persistent GPU state (shader, pipeline and sampler
//! caches); each frame it lends out a [`BatchDevice`] wrapping the command
//! encoder and backbuffer view, which `Batcher::render` submits draws to.

mod backend;
mod ctx;
mod mesh;
mod texture;

pub mod logging;

pub use backend::{BatchDevice, BatchRenderer};
pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::GpuMesh;
pub use texture::GpuTexture;
