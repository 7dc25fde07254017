use std::any::Any;
use std::rc::Rc;

/// Sampleable 2D texture owned by a backend.
///
/// Identity is by reference: two handles compare equal for batching purposes
/// only when they point at the same object.
pub trait Texture: Any {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// True when the texture is also drawable. On backends whose framebuffer
    /// origin is bottom-left, sampling a render target needs a V flip.
    fn is_render_target(&self) -> bool;
    /// Backend escape hatch for downcasting to the concrete texture type.
    fn as_any(&self) -> &dyn Any;
}

pub type TextureRef = Rc<dyn Texture>;

/// Drawable output surface (offscreen target).
pub trait Target: Any {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn as_any(&self) -> &dyn Any;
}

pub type TargetRef = Rc<dyn Target>;

/// Reference identity for optional texture handles.
#[inline]
pub fn same_texture(a: Option<&TextureRef>, b: Option<&TextureRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}
