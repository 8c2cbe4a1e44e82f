//! Physics module
//!
//! Broad-phase overlap only: axis-aligned boxes, a naive pairwise test per
//! collider kind and frame-to-frame enter/stay/exit tracking. There is no
//! solver; overlapping colliders are reported, never separated.

pub mod aabb;
pub mod collision_system;

pub use aabb::Aabb;
pub use collision_system::{
    ColliderRef, ColliderSample, CollisionEvent, CollisionPair, CollisionWorld, ContactKind,
    ContactPhase,
};

use crate::foundation::math::Vec3;

/// Identifies a collider kind; only colliders of the same kind are tested
/// against each other
pub type ColliderKind = &'static str;

/// Behaviors that take part in overlap detection
pub trait Collider {
    /// Kind this collider is grouped under
    fn collider_kind(&self) -> ColliderKind;

    /// World-space bounds given the owning entity's world position
    fn bounds(&self, world_position: &Vec3) -> Aabb;

    /// Trigger colliders report through the trigger hooks
    fn is_trigger(&self) -> bool;
}
