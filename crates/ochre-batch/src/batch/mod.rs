//! Retained-geometry 2D batcher.
//!
//! Geometry accumulates into shared vertex/index buffers; render state
//! changes (texture, sampler, blend, material, scissor, layer) split the
//! accumulation into contiguous index ranges so painter's order survives
//! submission. Nothing touches the GPU until [`Batcher::render`].

mod render;
mod shapes;
mod text;

#[cfg(test)]
mod tests;

use glam::{Affine2, Vec2};

use crate::buffer::GrowableBuffer;
use crate::color::Color;
use crate::coords::Rect;
use crate::gfx::{
    same_material, same_texture, BlendMode, MaterialRef, RendererFeatures, TextureRef,
    TextureSampler,
};
use crate::stack::AttributeStack;
use crate::vertex::Vertex;

pub const DEFAULT_MATRIX_UNIFORM: &str = "u_matrix";

/// How textured geometry weights the sampled texel.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Texel times vertex color.
    #[default]
    Normal,
    /// Vertex color, texel alpha. For tinted glyphs and silhouettes.
    Wash,
}

/// One contiguous run of triangles sharing render state.
///
/// `offset` and `elements` count triangles, not indices.
#[derive(Clone)]
pub struct DrawBatch {
    pub offset: u64,
    pub elements: u64,
    pub layer: i32,
    pub material: Option<MaterialRef>,
    pub texture: Option<TextureRef>,
    pub sampler: TextureSampler,
    pub blend: BlendMode,
    pub scissor: Option<Rect>,
    pub flip_vertically: bool,
}

impl Default for DrawBatch {
    fn default() -> Self {
        Self {
            offset: 0,
            elements: 0,
            layer: 0,
            material: None,
            texture: None,
            sampler: TextureSampler::default(),
            blend: BlendMode::NORMAL,
            scissor: None,
            flip_vertically: false,
        }
    }
}

/// Accumulates 2D geometry and render state, then submits index ranges in
/// insertion order.
///
/// Backend capabilities are injected at construction; the batcher itself
/// never talks to a device outside [`render`](Batcher::render).
pub struct Batcher {
    /// Uniform name the projection matrix is written under at submission.
    pub matrix_uniform: String,

    features: RendererFeatures,

    matrix: Affine2,
    color_mode: ColorMode,
    tex_mult: u8,
    tex_wash: u8,

    vertices: GrowableBuffer<Vertex>,
    indices: GrowableBuffer<u32>,

    batch: DrawBatch,
    batches: Vec<DrawBatch>,

    matrix_stack: AttributeStack<Affine2>,
    scissor_stack: AttributeStack<Option<Rect>>,
    blend_stack: AttributeStack<BlendMode>,
    material_stack: AttributeStack<Option<MaterialRef>>,
    layer_stack: AttributeStack<i32>,
    color_mode_stack: AttributeStack<ColorMode>,
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Batcher {
    pub fn new() -> Self {
        Self::with_features(RendererFeatures::default())
    }

    pub fn with_features(features: RendererFeatures) -> Self {
        Self {
            matrix_uniform: DEFAULT_MATRIX_UNIFORM.to_owned(),
            features,
            matrix: Affine2::IDENTITY,
            color_mode: ColorMode::Normal,
            tex_mult: 255,
            tex_wash: 0,
            vertices: GrowableBuffer::new(),
            indices: GrowableBuffer::new(),
            batch: DrawBatch::default(),
            batches: Vec::new(),
            matrix_stack: AttributeStack::new(),
            scissor_stack: AttributeStack::new(),
            blend_stack: AttributeStack::new(),
            material_stack: AttributeStack::new(),
            layer_stack: AttributeStack::new(),
            color_mode_stack: AttributeStack::new(),
        }
    }

    // ── active state ──────────────────────────────────────────────────────

    #[inline]
    pub fn matrix(&self) -> Affine2 {
        self.matrix
    }

    #[inline]
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    #[inline]
    pub fn scissor(&self) -> Option<Rect> {
        self.batch.scissor
    }

    #[inline]
    pub fn blend(&self) -> BlendMode {
        self.batch.blend
    }

    #[inline]
    pub fn material(&self) -> Option<&MaterialRef> {
        self.batch.material.as_ref()
    }

    #[inline]
    pub fn layer(&self) -> i32 {
        self.batch.layer
    }

    /// Total triangles accumulated since the last clear.
    pub fn triangle_count(&self) -> u64 {
        self.batch.offset + self.batch.elements
    }

    // ── state stacks ──────────────────────────────────────────────────────

    /// Composes `matrix` under the current transform and activates the
    /// result. Returns the previously-active matrix.
    pub fn push_matrix(&mut self, matrix: Affine2) -> Affine2 {
        let previous = self.matrix;
        self.matrix_stack.push(previous);
        self.matrix = previous * matrix;
        previous
    }

    /// Activates `matrix` as-is, ignoring the current transform. Returns the
    /// previously-active matrix.
    pub fn push_matrix_absolute(&mut self, matrix: Affine2) -> Affine2 {
        let previous = self.matrix;
        self.matrix_stack.push(previous);
        self.matrix = matrix;
        previous
    }

    pub fn pop_matrix(&mut self) -> Affine2 {
        let Some(saved) = self.matrix_stack.pop() else {
            return self.matrix;
        };
        let was = self.matrix;
        self.matrix = saved;
        was
    }

    pub fn push_scissor(&mut self, scissor: Option<Rect>) {
        self.scissor_stack.push(self.batch.scissor);
        self.set_scissor(scissor);
    }

    pub fn pop_scissor(&mut self) -> Option<Rect> {
        let Some(saved) = self.scissor_stack.pop() else {
            return self.batch.scissor;
        };
        let was = self.batch.scissor;
        self.set_scissor(saved);
        was
    }

    pub fn push_blend(&mut self, blend: BlendMode) {
        self.blend_stack.push(self.batch.blend);
        self.set_blend(blend);
    }

    pub fn pop_blend(&mut self) -> BlendMode {
        let Some(saved) = self.blend_stack.pop() else {
            return self.batch.blend;
        };
        let was = self.batch.blend;
        self.set_blend(saved);
        was
    }

    pub fn push_material(&mut self, material: Option<MaterialRef>) {
        self.material_stack.push(self.batch.material.clone());
        self.set_material(material);
    }

    pub fn pop_material(&mut self) -> Option<MaterialRef> {
        let Some(saved) = self.material_stack.pop() else {
            return self.batch.material.clone();
        };
        let was = self.batch.material.clone();
        self.set_material(saved);
        was
    }

    pub fn push_layer(&mut self, layer: i32) {
        self.layer_stack.push(self.batch.layer);
        self.set_layer(layer);
    }

    pub fn pop_layer(&mut self) -> i32 {
        let Some(saved) = self.layer_stack.pop() else {
            return self.batch.layer;
        };
        let was = self.batch.layer;
        self.set_layer(saved);
        was
    }

    /// Color mode only changes how upcoming vertices weight the texture; it
    /// never splits the batch.
    pub fn push_color_mode(&mut self, mode: ColorMode) {
        self.color_mode_stack.push(self.color_mode);
        self.set_color_mode(mode);
    }

    pub fn pop_color_mode(&mut self) -> ColorMode {
        let Some(saved) = self.color_mode_stack.pop() else {
            return self.color_mode;
        };
        let was = self.color_mode;
        self.set_color_mode(saved);
        was
    }

    // ── batch state ───────────────────────────────────────────────────────

    pub fn set_texture(&mut self, texture: Option<TextureRef>) {
        let same = same_texture(texture.as_ref(), self.batch.texture.as_ref());
        if self.batch.elements > 0 && !same {
            self.finalize_batch();
        }
        if !same {
            self.batch.flip_vertically = self.features.origin_bottom_left
                && texture.as_ref().is_some_and(|t| t.is_render_target());
            self.batch.texture = texture;
        }
    }

    pub fn set_sampler(&mut self, sampler: TextureSampler) {
        if self.batch.elements > 0 && sampler != self.batch.sampler {
            self.finalize_batch();
        }
        self.batch.sampler = sampler;
    }

    fn set_scissor(&mut self, scissor: Option<Rect>) {
        if self.batch.elements > 0 && scissor != self.batch.scissor {
            self.finalize_batch();
        }
        self.batch.scissor = scissor;
    }

    fn set_blend(&mut self, blend: BlendMode) {
        if self.batch.elements > 0 && blend != self.batch.blend {
            self.finalize_batch();
        }
        self.batch.blend = blend;
    }

    fn set_material(&mut self, material: Option<MaterialRef>) {
        if self.batch.elements > 0 && !same_material(material.as_ref(), self.batch.material.as_ref())
        {
            self.finalize_batch();
        }
        self.batch.material = material;
    }

    fn set_layer(&mut self, layer: i32) {
        if self.batch.elements > 0 && layer != self.batch.layer {
            self.finalize_batch();
        }
        self.batch.layer = layer;
    }

    fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
        (self.tex_mult, self.tex_wash) = match mode {
            ColorMode::Normal => (255, 0),
            ColorMode::Wash => (0, 255),
        };
    }

    /// Seals the in-progress batch and starts a successor at the next
    /// triangle offset, inheriting all render state.
    fn finalize_batch(&mut self) {
        self.batches.push(self.batch.clone());
        self.batch.offset += self.batch.elements;
        self.batch.elements = 0;
    }

    /// Drops all geometry and resets every stack and state value. Buffer
    /// capacity is retained.
    pub fn clear(&mut self) {
        self.matrix = Affine2::IDENTITY;
        self.set_color_mode(ColorMode::Normal);

        self.vertices.clear();
        self.indices.clear();

        self.batch = DrawBatch::default();
        self.batches.clear();

        self.matrix_stack.clear();
        self.scissor_stack.clear();
        self.blend_stack.clear();
        self.material_stack.clear();
        self.layer_stack.clear();
        self.color_mode_stack.clear();
    }

    // ── vertex emission ───────────────────────────────────────────────────

    /// `[mult, wash, fill]` weights for textured geometry under the active
    /// color mode.
    #[inline]
    fn tex_weights(&self) -> [u8; 3] {
        [self.tex_mult, self.tex_wash, 0]
    }

    #[inline]
    fn push_tri_geometry(&mut self, pos: [Vec2; 3], uv: [Vec2; 3], col: [Color; 3], weights: [u8; 3]) {
        let base = self.vertices.len() as u32;
        self.indices.expand(3).copy_from_slice(&[base, base + 1, base + 2]);

        let matrix = self.matrix;
        let flip = self.batch.flip_vertically;
        let out = self.vertices.expand(3);
        for i in 0..3 {
            out[i] = make_vertex(&matrix, flip, pos[i], uv[i], col[i], weights);
        }

        self.batch.elements += 1;
    }

    #[inline]
    fn push_quad_geometry(&mut self, pos: [Vec2; 4], uv: [Vec2; 4], col: [Color; 4], weights: [u8; 3]) {
        let base = self.vertices.len() as u32;
        self.indices
            .expand(6)
            .copy_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        let matrix = self.matrix;
        let flip = self.batch.flip_vertically;
        let out = self.vertices.expand(4);
        for i in 0..4 {
            out[i] = make_vertex(&matrix, flip, pos[i], uv[i], col[i], weights);
        }

        self.batch.elements += 2;
    }
}

/// Weights for untextured geometry: color passes through unmodified.
const FILL_WEIGHTS: [u8; 3] = [0, 0, 255];

const NO_UV: [Vec2; 4] = [Vec2::ZERO; 4];

#[inline]
fn make_vertex(matrix: &Affine2, flip: bool, pos: Vec2, uv: Vec2, col: Color, weights: [u8; 3]) -> Vertex {
    let p = matrix.transform_point2(pos);
    let v = if flip { 1.0 - uv.y } else { uv.y };
    Vertex {
        pos: [p.x, p.y],
        uv: [uv.x, v],
        col: col.to_array(),
        weights: [weights[0], weights[1], weights[2], 0],
    }
}
