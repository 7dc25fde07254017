use std::any::Any;
use std::rc::Rc;

use anyhow::ensure;
use ochre_batch::font::FontAtlas;
use ochre_batch::gfx::{Target, TargetRef, Texture, TextureRef};

use crate::ctx::RenderCtx;

pub(crate) const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// RGBA8 texture, usable both as a sampled texture and (when created with
/// [`GpuTexture::render_target`]) as an offscreen color target.
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    render_target: bool,
}

impl GpuTexture {
    /// Creates a sampled texture from tightly packed RGBA8 pixels.
    pub fn from_data(
        ctx: &RenderCtx<'_>,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> anyhow::Result<Self> {
        ensure!(width > 0 && height > 0, "texture dimensions must be non-zero");
        ensure!(
            rgba.len() == (width * height * 4) as usize,
            "expected {} bytes of RGBA data, got {}",
            width * height * 4,
            rgba.len()
        );

        let texture = create(ctx.device, width, height, wgpu::TextureUsages::TEXTURE_BINDING);
        upload(ctx.queue, &texture, width, height, rgba);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self { texture, view, width, height, render_target: false })
    }

    /// Creates an offscreen color target that can also be sampled.
    pub fn render_target(ctx: &RenderCtx<'_>, width: u32, height: u32) -> Self {
        let texture = create(
            ctx.device,
            width.max(1),
            height.max(1),
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view, width: width.max(1), height: height.max(1), render_target: true }
    }

    /// Expands a glyph coverage atlas into a white RGBA texture with coverage
    /// in alpha, so text renders through the normal multiply path.
    pub fn from_font_atlas(ctx: &RenderCtx<'_>, atlas: &FontAtlas) -> anyhow::Result<Self> {
        let mut rgba = Vec::with_capacity(atlas.coverage.len() * 4);
        for &a in &atlas.coverage {
            rgba.extend_from_slice(&[255, 255, 255, a]);
        }
        Self::from_data(ctx, atlas.width, atlas.height, &rgba)
    }

    pub fn into_texture_ref(self) -> TextureRef {
        Rc::new(self)
    }

    pub fn into_target_ref(self) -> TargetRef {
        Rc::new(self)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn raw(&self) -> &wgpu::Texture {
        &self.texture
    }
}

impl Texture for GpuTexture {
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

impl Target for GpuTexture {
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

fn create(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("ochre texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: usage | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn upload(queue: &wgpu::Queue, texture: &wgpu::Texture, width: u32, height: u32, rgba: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
    );
}
