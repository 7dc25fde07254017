//! Submission: turning accumulated batches into device draws.

use glam::Mat4;
use log::trace;

use super::{Batcher, DrawBatch};
use crate::gfx::{BatchDefaults, Mesh, RenderDevice, RenderPass, TargetRef};

const PROJECTION_NEAR: f32 = 0.01;
const PROJECTION_FAR: f32 = 1000.0;

impl Batcher {
    /// Submits everything accumulated since the last clear, using an
    /// orthographic projection over the target (or backbuffer) size.
    ///
    /// Geometry is not consumed; call [`clear`](Batcher::clear) to start the
    /// next frame.
    pub fn render<D: RenderDevice>(
        &mut self,
        device: &mut D,
        defaults: &mut BatchDefaults<D::Mesh>,
        target: Option<&TargetRef>,
    ) {
        let (w, h) = match target {
            Some(t) => (t.width(), t.height()),
            None => device.draw_size(),
        };
        let projection =
            Mat4::orthographic_rh(0.0, w as f32, h as f32, 0.0, PROJECTION_NEAR, PROJECTION_FAR);
        self.render_with(device, defaults, target, projection);
    }

    /// [`render`](Batcher::render) with an explicit projection.
    pub fn render_with<D: RenderDevice>(
        &mut self,
        device: &mut D,
        defaults: &mut BatchDefaults<D::Mesh>,
        target: Option<&TargetRef>,
        projection: Mat4,
    ) {
        if self.batches.is_empty() && self.batch.elements == 0 {
            return;
        }

        trace!(
            "submitting {} batches, {} triangles",
            self.batches.len() + (self.batch.elements > 0) as usize,
            self.triangle_count(),
        );

        defaults.mesh.set_vertex_data(self.vertices.as_slice());
        defaults.mesh.set_index_data(self.indices.as_slice());

        let matrix = projection.to_cols_array();
        for batch in &self.batches {
            submit(device, defaults, target, batch, &matrix, &self.matrix_uniform);
        }
        if self.batch.elements > 0 {
            submit(device, defaults, target, &self.batch, &matrix, &self.matrix_uniform);
        }
    }
}

fn submit<D: RenderDevice>(
    device: &mut D,
    defaults: &BatchDefaults<D::Mesh>,
    target: Option<&TargetRef>,
    batch: &DrawBatch,
    matrix: &[f32; 16],
    matrix_uniform: &str,
) {
    let material = batch.material.clone().unwrap_or_else(|| defaults.material.clone());
    {
        let mut bound = material.borrow_mut();
        bound.set_texture(0, batch.texture.clone());
        bound.set_sampler(0, batch.sampler);
        bound.set_uniform(matrix_uniform, matrix);
    }

    let pass = RenderPass {
        target,
        material,
        blend: batch.blend,
        viewport: None,
        scissor: batch.scissor,
        index_start: batch.offset * 3,
        index_count: batch.elements * 3,
    };
    device.perform(&defaults.mesh, &pass);
}
