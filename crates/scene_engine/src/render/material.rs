//! Material table
//!
//! Rendering is an external collaborator. The scene core only needs an
//! opaque handle per name that it can tell to apply itself with the frame's
//! camera matrices.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::foundation::math::Mat4;

/// Renderer-side material
pub trait Material {
    /// Bind the material for this frame's view and projection
    fn apply(&self, view: &Mat4, projection: &Mat4);
}

/// Shared material handle
pub type MaterialHandle = Rc<dyn Material>;

/// Material that does nothing; stands in when no renderer is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMaterial;

impl Material for NullMaterial {
    fn apply(&self, _view: &Mat4, _projection: &Mat4) {}
}

/// Name to material table
#[derive(Default, Clone)]
pub struct MaterialLibrary {
    materials: HashMap<String, MaterialHandle>,
}

impl MaterialLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a material
    pub fn insert(&mut self, name: impl Into<String>, material: MaterialHandle) -> &mut Self {
        let name = name.into();
        if self.materials.insert(name.clone(), material).is_some() {
            log::debug!("Material '{name}' replaced");
        }
        self
    }

    /// Builder pattern: Add a material
    pub fn with(mut self, name: impl Into<String>, material: impl Material + 'static) -> Self {
        self.insert(name, Rc::new(material));
        self
    }

    /// Material by name
    pub fn get(&self, name: &str) -> Option<MaterialHandle> {
        self.materials.get(name).cloned()
    }

    /// Whether a material with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    /// Number of materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl fmt::Debug for MaterialLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.materials.keys().collect();
        names.sort();
        f.debug_struct("MaterialLibrary").field("materials", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counting {
        applied: Cell<u32>,
    }

    impl Material for Counting {
        fn apply(&self, _view: &Mat4, _projection: &Mat4) {
            self.applied.set(self.applied.get() + 1);
        }
    }

    #[test]
    fn test_get_returns_shared_handle() {
        let counting = Rc::new(Counting::default());
        let mut library = MaterialLibrary::new();
        library.insert("base_mat", counting.clone());

        let handle = library.get("base_mat").unwrap();
        handle.apply(&Mat4::identity(), &Mat4::identity());

        assert_eq!(counting.applied.get(), 1);
        assert!(library.get("missing").is_none());
    }

    #[test]
    fn test_builder_and_len() {
        let library = MaterialLibrary::new().with("a", NullMaterial).with("b", NullMaterial);
        assert_eq!(library.len(), 2);
        assert!(library.contains("b"));
    }
}
