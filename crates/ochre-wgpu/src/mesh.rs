use log::trace;
use ochre_batch::gfx::Mesh;
use ochre_batch::Vertex;

use crate::ctx::RenderCtx;

/// GPU vertex/index storage for the batcher.
///
/// Buffers are created lazily and regrown in powers of two; uploads go
/// through `Queue::write_buffer`.
pub struct GpuMesh {
    device: wgpu::Device,
    queue: wgpu::Queue,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: u64,
    ibo: Option<wgpu::Buffer>,
    ibo_capacity: u64,

    vertex_count: u32,
    index_count: u32,
}

impl GpuMesh {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            vbo: None,
            vbo_capacity: 0,
            ibo: None,
            ibo_capacity: 0,
            vertex_count: 0,
            index_count: 0,
        }
    }

    pub(crate) fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.vbo.as_ref()
    }

    pub(crate) fn index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.ibo.as_ref()
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        buffer: &mut Option<wgpu::Buffer>,
        capacity: &mut u64,
        usage: wgpu::BufferUsages,
        label: &str,
        bytes: &[u8],
    ) {
        let needed = bytes.len() as u64;
        if buffer.is_none() || *capacity < needed {
            let new_capacity = needed.next_power_of_two().max(1024);
            trace!("growing {label} to {new_capacity} bytes");
            *buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: new_capacity,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            *capacity = new_capacity;
        }

        if let Some(buffer) = buffer {
            queue.write_buffer(buffer, 0, bytes);
        }
    }
}

impl Mesh for GpuMesh {
    fn set_vertex_data(&mut self, vertices: &[Vertex]) {
        self.vertex_count = vertices.len() as u32;
        if vertices.is_empty() {
            return;
        }
        Self::upload(
            &self.device,
            &self.queue,
            &mut self.vbo,
            &mut self.vbo_capacity,
            wgpu::BufferUsages::VERTEX,
            "ochre batch vbo",
            bytemuck::cast_slice(vertices),
        );
    }

    fn set_index_data(&mut self, indices: &[u32]) {
        self.index_count = indices.len() as u32;
        if indices.is_empty() {
            return;
        }
        Self::upload(
            &self.device,
            &self.queue,
            &mut self.ibo,
            &mut self.ibo_capacity,
            wgpu::BufferUsages::INDEX,
            "ochre batch ibo",
            bytemuck::cast_slice(indices),
        );
    }
}
