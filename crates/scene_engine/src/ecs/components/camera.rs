//! Camera behavior
//!
//! The first enabled camera instantiated in a scene becomes the active
//! camera. Its view and projection are handed to every material each frame.

use crate::ecs::{Behavior, FieldSchema, RegisteredBehavior};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Quat, Vec3};
use crate::render::RenderView;

/// Near clip plane distance
pub const NEAR_PLANE: f32 = 0.01;

/// Far clip plane distance
pub const FAR_PLANE: f32 = 1000.0;

/// Perspective camera following its entity
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Eye offset from the entity's world position
    pub position_offset: Vec3,
    /// Extra Euler rotation (degrees) applied on top of the entity's
    pub rotation_offset: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 60.0,
            position_offset: Vec3::zeros(),
            rotation_offset: Vec3::zeros(),
        }
    }
}

impl Camera {
    /// Builder pattern: Set the field of view in degrees
    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    /// Look-at view matrix for an entity at `position` with `rotation`.
    ///
    /// The camera looks along the entity's +Z and uses its +Y as up.
    pub fn view_matrix(&self, position: &Vec3, rotation: &Quat) -> Mat4 {
        let orientation = utils::quat_from_euler_degrees(&self.rotation_offset) * rotation;
        let eye = position + self.position_offset;
        let forward = orientation.inverse_transform_vector(&Vec3::z());
        let up = orientation.inverse_transform_vector(&Vec3::y());
        Mat4::look_at(eye, eye + forward, up)
    }

    /// Perspective projection for the given aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(utils::deg_to_rad(self.fov), aspect, NEAR_PLANE, FAR_PLANE)
    }

    /// View and projection together
    pub fn render_view(&self, position: &Vec3, rotation: &Quat, aspect: f32) -> RenderView {
        RenderView {
            view: self.view_matrix(position, rotation),
            projection: self.projection_matrix(aspect),
        }
    }
}

impl Behavior for Camera {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }
}

impl RegisteredBehavior for Camera {
    const TYPE_NAME: &'static str = "Camera";

    fn create() -> Self {
        Self::default()
    }

    fn schema() -> FieldSchema<Self> {
        FieldSchema::<Self>::new(Self::TYPE_NAME)
            .float("fov", |c, v| c.fov = v)
            .vec3("position_offset", |c, v| c.position_offset = v)
            .vec3("rotation_offset", |c, v| c.rotation_offset = v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_unrotated_camera_looks_down_positive_z() {
        let camera = Camera::default();
        let view = camera.view_matrix(&Vec3::zeros(), &Quat::identity());

        // A point straight ahead ends up on the view-space -Z axis
        let p = view.transform_point(&Point3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(p.coords, Vec3::new(0.0, 0.0, -5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_position_offset_moves_eye() {
        let camera = Camera {
            position_offset: Vec3::new(0.0, 2.0, 0.0),
            ..Default::default()
        };
        let view = camera.view_matrix(&Vec3::new(1.0, 0.0, 0.0), &Quat::identity());

        let eye = view.transform_point(&Point3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(eye.coords, Vec3::zeros(), epsilon = 1e-5);
    }

    #[test]
    fn test_projection_uses_fov() {
        let narrow = Camera::default().with_fov(30.0).projection_matrix(1.0);
        let wide = Camera::default().with_fov(90.0).projection_matrix(1.0);
        assert!(narrow[(1, 1)] > wide[(1, 1)]);
    }
}
