//! Behavior trait and per-entity component slots
//!
//! A [`Behavior`] is a unit of per-entity logic. Every hook has a no-op
//! default so a behavior only implements what it reacts to. Behaviors are
//! stored in [`ComponentSlot`]s, which carry the enable flag and the owning
//! entity alongside the boxed behavior.

use std::any::Any;

use crate::ecs::{BehaviorContext, EntityId, FieldValue};
use crate::physics::Collider;
use crate::scene::SceneInfo;

/// Downcasting support for trait objects
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-entity logic with lifecycle hooks
///
/// All hooks receive a [`BehaviorContext`] giving access to the owning
/// entity, the world, sibling behaviors and the current frame.
pub trait Behavior: AsAny {
    /// Human readable kind name used in diagnostics
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether this behavior keeps updating in editor mode
    fn runs_in_editor(&self) -> bool {
        false
    }

    /// Variable-rate update, once per frame
    fn update(&mut self, _ctx: &mut BehaviorContext<'_>, _dt: f32) {}

    /// Fixed-rate update, zero or more times per frame
    fn fixed_update(&mut self, _ctx: &mut BehaviorContext<'_>) {}

    /// The scene containing this behavior finished loading
    fn on_scene_load(&mut self, _ctx: &mut BehaviorContext<'_>, _scene: &SceneInfo) {}

    /// The scene containing this behavior is about to be replaced
    fn on_scene_unload(&mut self, _ctx: &mut BehaviorContext<'_>, _scene: &SceneInfo) {}

    /// A solid collider pair started overlapping
    fn on_collision_start(&mut self, _ctx: &mut BehaviorContext<'_>, _other: EntityId) {}

    /// A solid collider pair is still overlapping
    fn on_collision(&mut self, _ctx: &mut BehaviorContext<'_>, _other: EntityId) {}

    /// A solid collider pair stopped overlapping
    fn on_collision_exit(&mut self, _ctx: &mut BehaviorContext<'_>, _other: EntityId) {}

    /// A trigger pair started overlapping
    fn on_trigger_start(&mut self, _ctx: &mut BehaviorContext<'_>, _other: EntityId) {}

    /// A trigger pair is still overlapping
    fn on_trigger(&mut self, _ctx: &mut BehaviorContext<'_>, _other: EntityId) {}

    /// A trigger pair stopped overlapping
    fn on_trigger_exit(&mut self, _ctx: &mut BehaviorContext<'_>, _other: EntityId) {}

    /// Collider view of this behavior, if it takes part in overlap detection
    fn as_collider(&self) -> Option<&dyn Collider> {
        None
    }
}

/// Component errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    /// An enable flag was given something other than a boolean
    #[error("enabled flag of {behavior} must be a bool, got {found}")]
    NonBooleanFlag {
        /// Behavior kind (or `"entity"`)
        behavior: &'static str,
        /// Type of the rejected value
        found: &'static str,
    },
}

/// A behavior attached to an entity
pub struct ComponentSlot {
    owner: EntityId,
    enabled: bool,
    behavior: Box<dyn Behavior>,
}

impl ComponentSlot {
    pub(crate) fn new(owner: EntityId, behavior: Box<dyn Behavior>) -> Self {
        Self {
            owner,
            enabled: true,
            behavior,
        }
    }

    /// Entity this behavior was attached to
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Whether the behavior takes part in update passes
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable; takes effect on the next dispatch pass
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Set the enable flag from a document value. Anything but a boolean is
    /// rejected and leaves the flag unchanged.
    pub fn set_enabled_value(&mut self, value: &FieldValue) -> Result<(), ComponentError> {
        match value.as_bool() {
            Some(enabled) => {
                self.enabled = enabled;
                Ok(())
            }
            None => {
                let err = ComponentError::NonBooleanFlag {
                    behavior: self.type_name(),
                    found: value.type_name(),
                };
                log::error!("{err}");
                Err(err)
            }
        }
    }

    /// Kind name of the stored behavior
    pub fn type_name(&self) -> &'static str {
        self.behavior.as_ref().type_name()
    }

    /// Whether the behavior runs while in editor mode
    pub fn runs_in_editor(&self) -> bool {
        self.behavior.runs_in_editor()
    }

    /// Borrow the behavior
    pub fn behavior(&self) -> &dyn Behavior {
        self.behavior.as_ref()
    }

    /// Mutably borrow the behavior
    pub fn behavior_mut(&mut self) -> &mut dyn Behavior {
        self.behavior.as_mut()
    }

    /// Whether the stored behavior is a `T`
    pub fn is<T: Behavior>(&self) -> bool {
        self.behavior().as_any().is::<T>()
    }

    /// Borrow the behavior as a `T`
    pub fn downcast_ref<T: Behavior>(&self) -> Option<&T> {
        self.behavior().as_any().downcast_ref::<T>()
    }

    /// Mutably borrow the behavior as a `T`
    pub fn downcast_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        self.behavior_mut().as_any_mut().downcast_mut::<T>()
    }
}

impl std::fmt::Debug for ComponentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSlot")
            .field("type", &self.type_name())
            .field("owner", &self.owner)
            .field("enabled", &self.enabled)
            .finish()
    }
}
