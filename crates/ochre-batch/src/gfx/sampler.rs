#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    #[default]
    Clamp,
    Repeat,
}

/// Sampling state bound alongside a texture slot.
///
/// Changing the active sampler splits the batch but never recomputes the
/// vertical-flip flag; that only tracks the texture itself.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub filter: TextureFilter,
    pub wrap_x: TextureWrap,
    pub wrap_y: TextureWrap,
}

impl TextureSampler {
    #[inline]
    pub const fn new(filter: TextureFilter, wrap_x: TextureWrap, wrap_y: TextureWrap) -> Self {
        Self { filter, wrap_x, wrap_y }
    }

    #[inline]
    pub const fn nearest() -> Self {
        Self::new(TextureFilter::Nearest, TextureWrap::Clamp, TextureWrap::Clamp)
    }

    #[inline]
    pub const fn linear() -> Self {
        Self::new(TextureFilter::Linear, TextureWrap::Clamp, TextureWrap::Clamp)
    }
}
