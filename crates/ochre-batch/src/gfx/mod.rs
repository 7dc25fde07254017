//! Backend abstraction: the traits a GPU backend implements so the batcher
//! can stay headless.

mod blend;
mod material;
mod sampler;
mod subtexture;
mod texture;

pub use blend::{BlendFactor, BlendMode, BlendOp};
pub use material::{same_material, Material, MaterialRef, ParamMaterial};
pub use sampler::{TextureFilter, TextureSampler, TextureWrap};
pub use subtexture::Subtexture;
pub use texture::{same_texture, Target, TargetRef, Texture, TextureRef};

use crate::coords::Rect;
use crate::vertex::Vertex;

/// Backend-owned index/vertex storage the submitter uploads into.
pub trait Mesh {
    fn set_vertex_data(&mut self, vertices: &[Vertex]);
    fn set_index_data(&mut self, indices: &[u32]);
}

/// Backend capabilities that change how geometry is emitted.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RendererFeatures {
    /// Framebuffer origin is bottom-left (OpenGL-style). Sampling a render
    /// target then requires flipping V at emission time.
    pub origin_bottom_left: bool,
}

/// One indexed draw over a shared mesh.
pub struct RenderPass<'a> {
    /// Offscreen target, or `None` for the backbuffer.
    pub target: Option<&'a TargetRef>,
    pub material: MaterialRef,
    pub blend: BlendMode,
    pub viewport: Option<Rect>,
    pub scissor: Option<Rect>,
    /// First index, in indices (not triangles).
    pub index_start: u64,
    pub index_count: u64,
}

/// Draw execution backend.
pub trait RenderDevice {
    type Mesh: Mesh;

    /// Backbuffer size in pixels.
    fn draw_size(&self) -> (u32, u32);

    fn origin_bottom_left(&self) -> bool {
        false
    }

    fn perform(&mut self, mesh: &Self::Mesh, pass: &RenderPass<'_>);
}

/// Application-owned default resources, constructed once at startup and
/// passed to every render call.
pub struct BatchDefaults<M: Mesh> {
    pub mesh: M,
    pub material: MaterialRef,
}

impl<M: Mesh> BatchDefaults<M> {
    pub fn new(mesh: M, material: MaterialRef) -> Self {
        Self { mesh, material }
    }
}
