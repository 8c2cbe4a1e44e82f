//! Hierarchical transform
//!
//! Each [`Entity`](crate::ecs::Entity) owns exactly one `Transform`. A
//! transform may point at another entity as its parent; that link is a plain
//! [`EntityId`] and never implies ownership. Parent links are only written by
//! [`World`](crate::ecs::World), which rejects cycles, so every ancestor chain
//! is finite.
//!
//! World-space values are recomputed on every query by walking to the root:
//!
//! ```text
//! world_position = parent.world_position + parent.world_rotation * local_position
//! world_rotation = local_rotation * parent.world_rotation
//! ```

use crate::ecs::EntityId;
use crate::foundation::math::{utils, Mat4, Quat, Vec3};

/// Read access to the transforms of a set of entities
pub trait TransformLookup {
    /// Transform owned by `entity`, if it exists
    fn transform(&self, entity: EntityId) -> Option<&Transform>;
}

/// Local position, Euler rotation (degrees) and scale, plus an optional parent
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    parent: Option<EntityId>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            parent: None,
        }
    }
}

impl Transform {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create from position, Euler rotation in degrees and scale
    pub fn new(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: rotation_degrees,
            scale,
            parent: None,
        }
    }

    /// Builder pattern: Set Euler rotation in degrees
    pub fn with_rotation_degrees(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    //--- Local values ------------------------------------------------------

    /// Position relative to the parent
    pub fn local_position(&self) -> Vec3 {
        self.position
    }

    /// Overwrite the local position
    pub fn set_local_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Euler rotation in degrees relative to the parent
    pub fn local_rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Overwrite the local Euler rotation (degrees)
    pub fn set_local_rotation(&mut self, degrees: Vec3) {
        self.rotation = degrees;
    }

    /// Local rotation as a quaternion
    pub fn local_quaternion(&self) -> Quat {
        utils::quat_from_euler_degrees(&self.rotation)
    }

    /// Scale (never inherited from the parent)
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Overwrite the scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Parent entity, if any
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub(crate) fn set_parent_unchecked(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
    }

    //--- Local mutation -----------------------------------------------------

    /// Add `delta` to the local position
    pub fn move_by(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Add Euler degrees to the local rotation
    pub fn rotate_by_degrees(&mut self, degrees: Vec3) {
        self.rotation += degrees;
    }

    /// Add `delta` rotated by this transform's world rotation to the local
    /// position
    pub fn move_with_rotation(&mut self, delta: Vec3, lookup: &dyn TransformLookup) {
        let rotated = self.world_rotation(lookup) * delta;
        self.position += rotated;
    }

    //--- World values -------------------------------------------------------

    /// World position and rotation in one walk up the hierarchy
    pub fn world_pose(&self, lookup: &dyn TransformLookup) -> (Vec3, Quat) {
        let local_rotation = self.local_quaternion();
        match self.parent.and_then(|id| lookup.transform(id)) {
            Some(parent) => {
                let (parent_position, parent_rotation) = parent.world_pose(lookup);
                (
                    parent_position + parent_rotation * self.position,
                    local_rotation * parent_rotation,
                )
            }
            None => (self.position, local_rotation),
        }
    }

    /// World-space position
    pub fn world_position(&self, lookup: &dyn TransformLookup) -> Vec3 {
        self.world_pose(lookup).0
    }

    /// World-space rotation
    pub fn world_rotation(&self, lookup: &dyn TransformLookup) -> Quat {
        self.world_pose(lookup).1
    }

    /// translate(world_position) * rotate(world_rotation) * scale(local scale)
    pub fn model_matrix(&self, lookup: &dyn TransformLookup) -> Mat4 {
        let (position, rotation) = self.world_pose(lookup);
        utils::trs_matrix(&position, &rotation, &self.scale)
    }
}
