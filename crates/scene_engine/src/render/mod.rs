//! Rendering interface
//!
//! The scene core does not draw. It hands each entity's material the view
//! and projection of the active camera once per frame.

pub mod material;

pub use material::{Material, MaterialHandle, MaterialLibrary, NullMaterial};

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Camera matrices for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// World to view transform
    pub view: Mat4,
    /// View to clip transform
    pub projection: Mat4,
}

impl RenderView {
    /// View used when a scene has no camera: eye at the origin looking down
    /// +Z with a 60 degree field of view
    pub fn fallback(aspect: f32) -> Self {
        Self {
            view: Mat4::look_at(Vec3::zeros(), Vec3::new(0.0, 0.0, 5.0), Vec3::y()),
            projection: Mat4::perspective(utils::deg_to_rad(60.0), aspect, 0.01, 1000.0),
        }
    }
}

impl Default for RenderView {
    fn default() -> Self {
        Self::fallback(16.0 / 9.0)
    }
}
