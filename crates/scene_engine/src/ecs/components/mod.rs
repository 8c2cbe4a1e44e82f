//! Built-in behaviors

pub mod camera;
pub mod collider;

pub use camera::Camera;
pub use collider::CubeCollider;
