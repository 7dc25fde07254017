/// Blend equation operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Blend equation factor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Full fixed-function blend descriptor, separate color and alpha channels.
///
/// A batch splits whenever the active mode changes, so the whole descriptor
/// participates in equality and hashing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlendMode {
    pub color_op: BlendOp,
    pub color_src: BlendFactor,
    pub color_dst: BlendFactor,
    pub alpha_op: BlendOp,
    pub alpha_src: BlendFactor,
    pub alpha_dst: BlendFactor,
}

impl BlendMode {
    /// Standard alpha compositing (premultiplied source).
    pub const NORMAL: BlendMode = BlendMode::all(BlendOp::Add, BlendFactor::One, BlendFactor::OneMinusSrcAlpha);
    /// Glow/particle accumulation.
    pub const ADDITIVE: BlendMode = BlendMode::all(BlendOp::Add, BlendFactor::One, BlendFactor::One);
    pub const SUBTRACT: BlendMode = BlendMode::all(BlendOp::ReverseSubtract, BlendFactor::One, BlendFactor::One);
    pub const MULTIPLY: BlendMode =
        BlendMode::all(BlendOp::Add, BlendFactor::DstColor, BlendFactor::OneMinusSrcAlpha);
    pub const SCREEN: BlendMode = BlendMode::all(BlendOp::Add, BlendFactor::One, BlendFactor::OneMinusSrcColor);

    /// Same equation on both channels.
    #[inline]
    pub const fn all(op: BlendOp, src: BlendFactor, dst: BlendFactor) -> Self {
        Self {
            color_op: op,
            color_src: src,
            color_dst: dst,
            alpha_op: op,
            alpha_src: src,
            alpha_dst: dst,
        }
    }

    #[inline]
    pub const fn separate(
        color_op: BlendOp,
        color_src: BlendFactor,
        color_dst: BlendFactor,
        alpha_op: BlendOp,
        alpha_src: BlendFactor,
        alpha_dst: BlendFactor,
    ) -> Self {
        Self { color_op, color_src, color_dst, alpha_op, alpha_src, alpha_dst }
    }
}

impl Default for BlendMode {
    #[inline]
    fn default() -> Self {
        BlendMode::NORMAL
    }
}
