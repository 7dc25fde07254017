use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::sampler::TextureSampler;
use super::texture::TextureRef;

/// Shader parameter bag bound for a draw: texture slots, sampler slots and
/// named float uniforms.
///
/// The submitter writes the batch texture, sampler and projection matrix
/// into the bound material right before each draw; backends read the state
/// back through the getters.
pub trait Material {
    fn set_texture(&mut self, slot: u32, texture: Option<TextureRef>);
    fn texture(&self, slot: u32) -> Option<TextureRef>;
    fn set_sampler(&mut self, slot: u32, sampler: TextureSampler);
    fn sampler(&self, slot: u32) -> TextureSampler;
    fn set_uniform(&mut self, name: &str, values: &[f32]);
    fn uniform(&self, name: &str) -> Option<&[f32]>;
}

pub type MaterialRef = Rc<RefCell<dyn Material>>;

/// Reference identity for optional material handles.
#[inline]
pub fn same_material(a: Option<&MaterialRef>, b: Option<&MaterialRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Standard [`Material`] implementation: plain storage, no GPU state.
#[derive(Default)]
pub struct ParamMaterial {
    textures: HashMap<u32, TextureRef>,
    samplers: HashMap<u32, TextureSampler>,
    uniforms: HashMap<String, Vec<f32>>,
}

impl ParamMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_ref(self) -> MaterialRef {
        Rc::new(RefCell::new(self))
    }
}

impl Material for ParamMaterial {
    fn set_texture(&mut self, slot: u32, texture: Option<TextureRef>) {
        match texture {
            Some(t) => {
                self.textures.insert(slot, t);
            }
            None => {
                self.textures.remove(&slot);
            }
        }
    }

    fn texture(&self, slot: u32) -> Option<TextureRef> {
        self.textures.get(&slot).cloned()
    }

    fn set_sampler(&mut self, slot: u32, sampler: TextureSampler) {
        self.samplers.insert(slot, sampler);
    }

    fn sampler(&self, slot: u32) -> TextureSampler {
        self.samplers.get(&slot).copied().unwrap_or_default()
    }

    fn set_uniform(&mut self, name: &str, values: &[f32]) {
        match self.uniforms.get_mut(name) {
            Some(existing) => {
                existing.clear();
                existing.extend_from_slice(values);
            }
            None => {
                self.uniforms.insert(name.to_owned(), values.to_vec());
            }
        }
    }

    fn uniform(&self, name: &str) -> Option<&[f32]> {
        self.uniforms.get(name).map(|v| v.as_slice())
    }
}
