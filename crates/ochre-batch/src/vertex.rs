use bytemuck::{Pod, Zeroable};

/// GPU vertex for batched 2D geometry.
///
/// The fragment contract is
/// `mult * tex * col + wash * tex.a * col + fill * col`,
/// with the three weights normalized from bytes. Solid geometry sets
/// `fill = 255`; textured geometry sets `mult` or `wash` depending on the
/// active color mode.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in logical pixels, already transformed by the matrix stack.
    pub pos: [f32; 2],
    /// Normalized texture coordinates.
    pub uv: [f32; 2],
    /// Straight-alpha RGBA.
    pub col: [u8; 4],
    /// `[mult, wash, fill, 0]` blend weights.
    pub weights: [u8; 4],
}

impl Vertex {
    pub const SIZE: usize = std::mem::size_of::<Vertex>();
}
