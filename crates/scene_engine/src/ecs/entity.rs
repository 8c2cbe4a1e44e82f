//! Entity implementation
//!
//! An entity owns its [`Transform`] and an ordered list of behaviors.
//! Behaviors are appended, never removed; the whole entity is dropped when
//! the scene is replaced.

use crate::ecs::{Behavior, ComponentError, ComponentSlot, FieldValue, Transform};
use crate::render::MaterialHandle;

slotmap::new_key_type! {
    /// Entity identifier. Keys from a previous scene never resolve again.
    pub struct EntityId;
}

/// A named object in the scene
pub struct Entity {
    id: EntityId,
    name: String,
    enabled: bool,
    transform: Transform,
    material: Option<MaterialHandle>,
    pub(crate) components: Vec<ComponentSlot>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: impl Into<String>, transform: Transform) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            transform,
            material: None,
            components: Vec::new(),
        }
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether the entity takes part in the update pass
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable; takes effect on the next dispatch pass
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Set the enable flag from a document value. Anything but a boolean is
    /// rejected and leaves the flag unchanged.
    pub fn set_active(&mut self, value: &FieldValue) -> Result<&mut Self, ComponentError> {
        let Some(enabled) = value.as_bool() else {
            let err = ComponentError::NonBooleanFlag {
                behavior: "entity",
                found: value.type_name(),
            };
            log::error!("{}: {err}", self.name);
            return Err(err);
        };
        self.enabled = enabled;
        Ok(self)
    }

    /// Owned transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable owned transform. Parent links are changed through
    /// [`World::set_parent`](crate::ecs::World::set_parent).
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Material applied once per update, if any
    pub fn material(&self) -> Option<&MaterialHandle> {
        self.material.as_ref()
    }

    /// Attach or clear the material
    pub fn set_material(&mut self, material: Option<MaterialHandle>) {
        self.material = material;
    }

    /// Append a behavior; returns its slot index
    pub fn add_component<B: Behavior>(&mut self, behavior: B) -> usize {
        self.add_boxed_component(Box::new(behavior))
    }

    /// Append an already boxed behavior; returns its slot index
    pub fn add_boxed_component(&mut self, behavior: Box<dyn Behavior>) -> usize {
        log::trace!("{}: attach {}", self.name, behavior.type_name());
        self.components.push(ComponentSlot::new(self.id, behavior));
        self.components.len() - 1
    }

    /// First enabled behavior of type `T`
    pub fn get_component<T: Behavior>(&self) -> Option<&T> {
        let found = self
            .components
            .iter()
            .filter(|slot| slot.is_enabled())
            .find_map(ComponentSlot::downcast_ref::<T>);
        if found.is_none() && self.components.iter().any(ComponentSlot::is::<T>) {
            log::warn!(
                "{}: {} is attached but disabled",
                self.name,
                std::any::type_name::<T>()
            );
        }
        found
    }

    /// First enabled behavior of type `T`, mutably
    pub fn get_component_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .filter(|slot| slot.is_enabled())
            .find_map(ComponentSlot::downcast_mut::<T>)
    }

    /// Every behavior of type `T`, enabled or not
    pub fn get_components<T: Behavior>(&self) -> Vec<&T> {
        self.components
            .iter()
            .filter_map(ComponentSlot::downcast_ref::<T>)
            .collect()
    }

    /// Whether an enabled behavior of type `T` is attached
    pub fn has_component<T: Behavior>(&self) -> bool {
        self.components
            .iter()
            .any(|slot| slot.is_enabled() && slot.is::<T>())
    }

    /// All slots in attachment order
    pub fn components(&self) -> &[ComponentSlot] {
        &self.components
    }

    /// One slot by index
    pub fn component_slot(&self, index: usize) -> Option<&ComponentSlot> {
        self.components.get(index)
    }

    /// One slot by index, mutably
    pub fn component_slot_mut(&mut self, index: usize) -> Option<&mut ComponentSlot> {
        self.components.get_mut(index)
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("transform", &self.transform)
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}
