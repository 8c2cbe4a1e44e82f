//! Axis-aligned cube collider

use crate::ecs::{Behavior, FieldSchema, FrameHookContext, RegisteredBehavior};
use crate::foundation::math::Vec3;
use crate::physics::{Aabb, Collider, ColliderKind};

/// Box collider centred on its entity's world position.
///
/// The box spans `world_position + pos_offset ± scale_factor / 2`. Only
/// other `CubeCollider`s are tested against it.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeCollider {
    /// Full edge lengths of the box
    pub scale_factor: Vec3,
    /// Offset of the box centre from the entity's world position
    pub pos_offset: Vec3,
    /// Report overlaps through the trigger hooks
    pub trigger: bool,
}

impl Default for CubeCollider {
    fn default() -> Self {
        Self {
            scale_factor: Vec3::new(1.0, 1.0, 1.0),
            pos_offset: Vec3::zeros(),
            trigger: false,
        }
    }
}

impl CubeCollider {
    /// Create a solid collider of the given size
    pub fn new(scale_factor: Vec3) -> Self {
        Self {
            scale_factor,
            ..Default::default()
        }
    }

    /// Builder pattern: Set the centre offset
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.pos_offset = offset;
        self
    }

    /// Builder pattern: Make this a trigger
    pub fn as_trigger(mut self) -> Self {
        self.trigger = true;
        self
    }
}

impl Behavior for CubeCollider {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn runs_in_editor(&self) -> bool {
        true
    }

    fn as_collider(&self) -> Option<&dyn Collider> {
        Some(self)
    }
}

impl Collider for CubeCollider {
    fn collider_kind(&self) -> ColliderKind {
        Self::TYPE_NAME
    }

    fn bounds(&self, world_position: &Vec3) -> Aabb {
        Aabb::from_center_size(world_position + self.pos_offset, self.scale_factor)
    }

    fn is_trigger(&self) -> bool {
        self.trigger
    }
}

impl RegisteredBehavior for CubeCollider {
    const TYPE_NAME: &'static str = "CubeCollider";

    fn create() -> Self {
        Self::default()
    }

    fn schema() -> FieldSchema<Self> {
        FieldSchema::<Self>::new(Self::TYPE_NAME)
            .vec3("scale_factor", |c, v| c.scale_factor = v)
            .vec3("pos_offset", |c, v| c.pos_offset = v)
            .boolean("trigger_collider", |c, v| c.trigger = v)
    }

    fn on_frame_start(ctx: &mut FrameHookContext<'_>) {
        ctx.collisions.begin_frame(Self::TYPE_NAME, ctx.frame);
    }
}
