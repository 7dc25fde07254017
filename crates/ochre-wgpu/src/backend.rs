use std::collections::HashMap;

use log::warn;
use ochre_batch::batch::DEFAULT_MATRIX_UNIFORM;
use ochre_batch::coords::{Mat4, Rect};
use ochre_batch::gfx::{
    BlendFactor, BlendMode, BlendOp, RenderDevice, RenderPass, TextureFilter, TextureSampler,
    TextureWrap,
};
use ochre_batch::Vertex;
use wgpu::util::DeviceExt;

use crate::ctx::{RenderCtx, RenderTarget};
use crate::mesh::GpuMesh;
use crate::texture::{GpuTexture, TEXTURE_FORMAT};

static VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x2,
    1 => Float32x2,
    2 => Unorm8x4,
    3 => Unorm8x4,
];

/// Persistent GPU state for executing batch draws: shader, bind group
/// layout, pipeline and sampler caches, and a 1x1 white fallback texture.
///
/// Hand out a per-frame [`BatchDevice`] through [`BatchRenderer::frame`] and
/// pass that to `Batcher::render`.
pub struct BatchRenderer {
    device: wgpu::Device,
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<(wgpu::TextureFormat, BlendMode), wgpu::RenderPipeline>,
    samplers: HashMap<TextureSampler, wgpu::Sampler>,
    white_view: wgpu::TextureView,
}

impl BatchRenderer {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let device = ctx.device.clone();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ochre batch shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/batch.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ochre batch bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ochre batch pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let white_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ochre batch white"),
            size: wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &white_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[255, 255, 255, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
        );
        let white_view = white_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            device,
            shader,
            bind_group_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            samplers: HashMap::new(),
            white_view,
        }
    }

    /// Borrows the renderer and a frame's encoder/backbuffer as a
    /// [`RenderDevice`] the batcher can submit to.
    pub fn frame<'a>(
        &'a mut self,
        ctx: &RenderCtx<'_>,
        target: RenderTarget<'a>,
    ) -> BatchDevice<'a> {
        BatchDevice {
            renderer: self,
            encoder: target.encoder,
            color_view: target.color_view,
            format: ctx.surface_format,
            size: ctx.surface_size,
        }
    }

    fn pipeline_for(
        &mut self,
        format: wgpu::TextureFormat,
        blend: BlendMode,
    ) -> &wgpu::RenderPipeline {
        if !self.pipelines.contains_key(&(format, blend)) {
            let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("ochre batch pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: Vertex::SIZE as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &VERTEX_ATTRIBUTES,
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(blend_state(blend)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });
            self.pipelines.insert((format, blend), pipeline);
        }
        &self.pipelines[&(format, blend)]
    }

    fn sampler_for(&mut self, sampler: TextureSampler) -> &wgpu::Sampler {
        if !self.samplers.contains_key(&sampler) {
            let created = self.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("ochre batch sampler"),
                address_mode_u: address_mode(sampler.wrap_x),
                address_mode_v: address_mode(sampler.wrap_y),
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter_mode(sampler.filter),
                min_filter: filter_mode(sampler.filter),
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            });
            self.samplers.insert(sampler, created);
        }
        &self.samplers[&sampler]
    }
}

/// One frame's [`RenderDevice`]: the persistent renderer plus the encoder
/// and backbuffer view being recorded into.
pub struct BatchDevice<'a> {
    renderer: &'a mut BatchRenderer,
    encoder: &'a mut wgpu::CommandEncoder,
    color_view: &'a wgpu::TextureView,
    format: wgpu::TextureFormat,
    size: (u32, u32),
}

impl RenderDevice for BatchDevice<'_> {
    type Mesh = GpuMesh;

    fn draw_size(&self) -> (u32, u32) {
        self.size
    }

    fn perform(&mut self, mesh: &GpuMesh, pass: &RenderPass<'_>) {
        if pass.index_count == 0 {
            return;
        }
        let (Some(vbo), Some(ibo)) = (mesh.vertex_buffer(), mesh.index_buffer()) else {
            return;
        };

        let offscreen = match pass.target {
            Some(target) => match target.as_any().downcast_ref::<GpuTexture>() {
                Some(texture) => Some(texture),
                None => {
                    warn!("render target is not a GpuTexture, skipping draw");
                    return;
                }
            },
            None => None,
        };
        let (view, size, format) = match offscreen {
            Some(t) => (t.view(), (t.width(), t.height()), TEXTURE_FORMAT),
            None => (self.color_view, self.size, self.format),
        };

        let scissor = match pass.scissor {
            Some(clip) => match clip_to_scissor(clip, size) {
                Some(scissor) => Some(scissor),
                // Fully clipped, nothing to draw.
                None => return,
            },
            None => None,
        };

        let (texture, sampler_state, matrix) = {
            let material = pass.material.borrow();
            let matrix: [f32; 16] = material
                .uniform(DEFAULT_MATRIX_UNIFORM)
                .and_then(|values| values.try_into().ok())
                .unwrap_or_else(|| {
                    warn!("material has no {DEFAULT_MATRIX_UNIFORM} mat4, using identity");
                    Mat4::IDENTITY.to_cols_array()
                });
            (material.texture(0), material.sampler(0), matrix)
        };

        let sampler = self.renderer.sampler_for(sampler_state).clone();
        let texture_view = texture
            .as_ref()
            .and_then(|t| t.as_any().downcast_ref::<GpuTexture>())
            .map(|t| t.view())
            .unwrap_or(&self.renderer.white_view);

        let uniforms = self.renderer.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ochre batch uniforms"),
            contents: bytemuck::cast_slice(&matrix),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = self.renderer.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ochre batch bind group"),
            layout: &self.renderer.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: uniforms.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        let pipeline = self.renderer.pipeline_for(format, pass.blend).clone();

        let mut rpass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ochre batch pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(&pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        if let Some(viewport) = pass.viewport {
            rpass.set_viewport(
                viewport.origin.x,
                viewport.origin.y,
                viewport.size.x,
                viewport.size.y,
                0.0,
                1.0,
            );
        }
        if let Some((x, y, w, h)) = scissor {
            rpass.set_scissor_rect(x, y, w, h);
        }
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
        let start = pass.index_start as u32;
        rpass.draw_indexed(start..start + pass.index_count as u32, 0, 0..1);
    }
}

/// Clamps a clip rect to the target bounds; `None` means nothing is visible.
fn clip_to_scissor(clip: Rect, size: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let clip = clip.normalized();
    let x0 = clip.origin.x.max(0.0).floor();
    let y0 = clip.origin.y.max(0.0).floor();
    let x1 = (clip.origin.x + clip.size.x).min(size.0 as f32).ceil();
    let y1 = (clip.origin.y + clip.size.y).min(size.1 as f32).ceil();
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: blend_factor(mode.color_src),
            dst_factor: blend_factor(mode.color_dst),
            operation: blend_op(mode.color_op),
        },
        alpha: wgpu::BlendComponent {
            src_factor: blend_factor(mode.alpha_src),
            dst_factor: blend_factor(mode.alpha_dst),
            operation: blend_op(mode.alpha_op),
        },
    }
}

fn blend_op(op: BlendOp) -> wgpu::BlendOperation {
    match op {
        BlendOp::Add => wgpu::BlendOperation::Add,
        BlendOp::Subtract => wgpu::BlendOperation::Subtract,
        BlendOp::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
        BlendOp::Min => wgpu::BlendOperation::Min,
        BlendOp::Max => wgpu::BlendOperation::Max,
    }
}

fn blend_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}

fn filter_mode(filter: TextureFilter) -> wgpu::FilterMode {
    match filter {
        TextureFilter::Linear => wgpu::FilterMode::Linear,
        TextureFilter::Nearest => wgpu::FilterMode::Nearest,
    }
}

fn address_mode(wrap: TextureWrap) -> wgpu::AddressMode {
    match wrap {
        TextureWrap::Clamp => wgpu::AddressMode::ClampToEdge,
        TextureWrap::Repeat => wgpu::AddressMode::Repeat,
    }
}
