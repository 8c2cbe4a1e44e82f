//! Execution context handed to behavior hooks
//!
//! While a behavior runs, its entity's component list is detached from the
//! world. The behavior reaches its siblings through [`Siblings`] and
//! everything else through the world, so no two live borrows alias.

use crate::core::ExecutionMode;
use crate::ecs::{Behavior, ComponentSlot, Entity, EntityId, Transform, World};
use crate::foundation::math::{Quat, Vec3};
use crate::input::InputState;
use crate::physics::CollisionWorld;
use crate::render::RenderView;
use crate::scene::SceneRef;

/// Per-frame values shared by every hook in one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo<'a> {
    /// Frame counter, starting at 1 for the first tick
    pub frame: u64,
    /// Seconds since the previous frame
    pub delta: f32,
    /// Length of one fixed step in seconds
    pub fixed_delta: f32,
    /// Runtime or editor
    pub mode: ExecutionMode,
    /// Input snapshot for this frame
    pub input: &'a InputState,
    /// Camera matrices for this frame
    pub view: RenderView,
}

/// Context for the class-scoped `on_frame_start` / `on_frame_end` hooks
pub struct FrameHookContext<'a> {
    /// Frame counter
    pub frame: u64,
    /// Collision buffers of every collider kind
    pub collisions: &'a mut CollisionWorld,
}

/// The other behaviors on the entity currently being dispatched
pub struct Siblings<'a> {
    before: &'a mut [ComponentSlot],
    after: &'a mut [ComponentSlot],
}

impl<'a> Siblings<'a> {
    pub(crate) fn new(before: &'a mut [ComponentSlot], after: &'a mut [ComponentSlot]) -> Self {
        Self { before, after }
    }

    /// Iterate every sibling slot in list order
    pub fn iter(&self) -> impl Iterator<Item = &ComponentSlot> {
        self.before.iter().chain(self.after.iter())
    }

    /// Iterate every sibling slot mutably in list order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ComponentSlot> {
        self.before.iter_mut().chain(self.after.iter_mut())
    }

    /// First enabled sibling of type `T`
    pub fn get<T: Behavior>(&self) -> Option<&T> {
        self.iter()
            .filter(|slot| slot.is_enabled())
            .find_map(ComponentSlot::downcast_ref::<T>)
    }

    /// First enabled sibling of type `T`, mutably
    pub fn get_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        self.iter_mut()
            .filter(|slot| slot.is_enabled())
            .find_map(ComponentSlot::downcast_mut::<T>)
    }

    /// Number of siblings
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// Whether the behavior is alone on its entity
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a behavior hook may touch
pub struct BehaviorContext<'a> {
    entity: EntityId,
    world: &'a mut World,
    siblings: Siblings<'a>,
    frame: &'a FrameInfo<'a>,
    scene_request: &'a mut Option<SceneRef>,
}

impl<'a> BehaviorContext<'a> {
    pub(crate) fn new(
        entity: EntityId,
        world: &'a mut World,
        siblings: Siblings<'a>,
        frame: &'a FrameInfo<'a>,
        scene_request: &'a mut Option<SceneRef>,
    ) -> Self {
        Self {
            entity,
            world,
            siblings,
            frame,
            scene_request,
        }
    }

    /// The entity owning the running behavior
    pub fn entity_id(&self) -> EntityId {
        self.entity
    }

    /// The owning entity. Its component list is empty while a hook runs;
    /// use [`siblings`](Self::siblings) instead.
    pub fn entity(&self) -> Option<&Entity> {
        self.world.entity(self.entity)
    }

    /// The owning entity, mutably
    pub fn entity_mut(&mut self) -> Option<&mut Entity> {
        self.world.entity_mut(self.entity)
    }

    /// Name of the owning entity
    pub fn name(&self) -> &str {
        self.entity().map_or("", Entity::name)
    }

    /// Read access to the whole world
    pub fn world(&self) -> &World {
        &*self.world
    }

    /// Write access to the whole world
    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    /// Other behaviors on the owning entity
    pub fn siblings(&self) -> &Siblings<'a> {
        &self.siblings
    }

    /// Other behaviors on the owning entity, mutably
    pub fn siblings_mut(&mut self) -> &mut Siblings<'a> {
        &mut self.siblings
    }

    /// Current frame values
    pub fn frame(&self) -> &FrameInfo<'a> {
        self.frame
    }

    /// Input snapshot for this frame
    pub fn input(&self) -> &InputState {
        self.frame.input
    }

    /// Runtime or editor
    pub fn mode(&self) -> ExecutionMode {
        self.frame.mode
    }

    //--- Transform shortcuts -----------------------------------------------

    /// The owning entity's transform
    pub fn transform(&self) -> Option<&Transform> {
        self.entity().map(Entity::transform)
    }

    /// The owning entity's transform, mutably
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.entity_mut().map(Entity::transform_mut)
    }

    /// World-space position of the owning entity
    pub fn world_position(&self) -> Vec3 {
        self.world.world_position(self.entity).unwrap_or_else(Vec3::zeros)
    }

    /// World-space rotation of the owning entity
    pub fn world_rotation(&self) -> Quat {
        self.world.world_rotation(self.entity).unwrap_or_else(Quat::identity)
    }

    /// Move the owning entity in its local space
    pub fn move_by(&mut self, delta: Vec3) {
        if let Some(transform) = self.transform_mut() {
            transform.move_by(delta);
        }
    }

    /// Move the owning entity along its own world orientation
    pub fn move_with_rotation(&mut self, delta: Vec3) {
        self.world.move_with_rotation(self.entity, delta);
    }

    /// Rotate the owning entity by Euler degrees
    pub fn rotate_by_degrees(&mut self, degrees: Vec3) {
        if let Some(transform) = self.transform_mut() {
            transform.rotate_by_degrees(degrees);
        }
    }

    //--- Scene control -----------------------------------------------------

    /// Ask for a scene change once the current frame has finished. A later
    /// request in the same frame replaces an earlier one.
    pub fn request_scene(&mut self, scene: impl Into<SceneRef>) {
        let scene = scene.into();
        log::debug!("{}: scene change to {scene} requested", self.name());
        *self.scene_request = Some(scene);
    }
}
