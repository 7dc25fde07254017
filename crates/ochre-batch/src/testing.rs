//! Recording stand-ins for the backend traits so tests run headless.

use std::any::Any;
use std::rc::Rc;

use crate::coords::Rect;
use crate::gfx::{
    BlendMode, Mesh, RenderDevice, RenderPass, Target, TargetRef, Texture, TextureRef,
    TextureSampler,
};
use crate::vertex::Vertex;

pub struct StubTexture {
    pub width: u32,
    pub height: u32,
    pub render_target: bool,
}

impl StubTexture {
    pub fn shared(width: u32, height: u32) -> TextureRef {
        Rc::new(Self { width, height, render_target: false })
    }

    pub fn shared_render_target(width: u32, height: u32) -> TextureRef {
        Rc::new(Self { width, height, render_target: true })
    }
}

impl Texture for StubTexture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_render_target(&self) -> bool {
        self.render_target
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct StubTarget {
    pub width: u32,
    pub height: u32,
}

impl StubTarget {
    pub fn shared(width: u32, height: u32) -> TargetRef {
        Rc::new(Self { width, height })
    }
}

impl Target for StubTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Mesh that keeps the last uploaded data for assertions.
#[derive(Default)]
pub struct RecordingMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub vertex_uploads: u32,
    pub index_uploads: u32,
}

impl Mesh for RecordingMesh {
    fn set_vertex_data(&mut self, vertices: &[Vertex]) {
        self.vertices = vertices.to_vec();
        self.vertex_uploads += 1;
    }

    fn set_index_data(&mut self, indices: &[u32]) {
        self.indices = indices.to_vec();
        self.index_uploads += 1;
    }
}

/// One draw recorded by [`RecordingDevice`], with the material state read
/// back at perform time.
pub struct PerformedDraw {
    pub index_start: u64,
    pub index_count: u64,
    pub offscreen: bool,
    pub blend: BlendMode,
    pub scissor: Option<Rect>,
    pub texture: Option<TextureRef>,
    pub sampler: TextureSampler,
    pub matrix: Option<Vec<f32>>,
    pub used_default_material: bool,
}

/// Device that records every perform call instead of drawing.
pub struct RecordingDevice {
    pub size: (u32, u32),
    pub origin_bottom_left: bool,
    pub draws: Vec<PerformedDraw>,
    /// Material considered "the default" for `used_default_material`.
    pub default_material: Option<crate::gfx::MaterialRef>,
}

impl RecordingDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            origin_bottom_left: false,
            draws: Vec::new(),
            default_material: None,
        }
    }
}

impl RenderDevice for RecordingDevice {
    type Mesh = RecordingMesh;

    fn draw_size(&self) -> (u32, u32) {
        self.size
    }

    fn origin_bottom_left(&self) -> bool {
        self.origin_bottom_left
    }

    fn perform(&mut self, _mesh: &RecordingMesh, pass: &RenderPass<'_>) {
        let bound = pass.material.borrow();
        self.draws.push(PerformedDraw {
            index_start: pass.index_start,
            index_count: pass.index_count,
            offscreen: pass.target.is_some(),
            blend: pass.blend,
            scissor: pass.scissor,
            texture: bound.texture(0),
            sampler: bound.sampler(0),
            matrix: bound.uniform("u_matrix").map(|m| m.to_vec()),
            used_default_material: self
                .default_material
                .as_ref()
                .is_some_and(|d| Rc::ptr_eq(d, &pass.material)),
        });
    }
}
