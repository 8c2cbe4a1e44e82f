//! Scene world: entity storage, hierarchy and behavior dispatch

use slotmap::SlotMap;

use crate::core::ExecutionMode;
use crate::ecs::{
    Behavior, BehaviorContext, Entity, EntityId, FrameInfo, Siblings, Transform, TransformLookup,
};
use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::scene::{HierarchyTree, SceneRef};

/// Parent link errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// The entity does not exist in this world
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// The new parent is the entity itself or one of its descendants
    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Entity being re-parented
        child: EntityId,
        /// Rejected parent
        parent: EntityId,
    },
}

/// Which behaviors of an entity a dispatch pass reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchFilter {
    /// Every behavior, enabled or not
    All,
    /// Enabled behaviors only
    Enabled,
    /// Enabled behaviors, minus non-editor ones in editor mode
    Update(ExecutionMode),
}

/// Entity and behavior flags captured when a pass starts
#[derive(Debug)]
pub(crate) struct PassEntry {
    pub(crate) entity: EntityId,
    mask: Vec<bool>,
}

/// Every entity of the active scene
///
/// Only the scene manager empties a world, when it replaces the scene.
/// Behaviors holding `&mut World` can spawn and edit entities but not clear
/// them all:
///
/// ```compile_fail
/// let mut world = scene_engine::ecs::World::new();
/// world.clear();
/// ```
#[derive(Default)]
pub struct World {
    entities: SlotMap<EntityId, Entity>,
    order: Vec<EntityId>,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    //--- Storage -------------------------------------------------------------

    /// Create a root entity and append it to the active list
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> EntityId {
        let id = self.insert(name, transform);
        self.order.push(id);
        id
    }

    /// Create an entity parented to `parent` and append it to the active list
    pub fn spawn_child(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        parent: EntityId,
    ) -> Result<EntityId, HierarchyError> {
        let id = self.insert_child(name, transform, parent)?;
        self.order.push(id);
        Ok(id)
    }

    /// Create an entity that is not yet part of the active list
    pub(crate) fn insert(&mut self, name: impl Into<String>, mut transform: Transform) -> EntityId {
        transform.set_parent_unchecked(None);
        let name = name.into();
        self.entities
            .insert_with_key(|id| Entity::new(id, name, transform))
    }

    pub(crate) fn insert_child(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        parent: EntityId,
    ) -> Result<EntityId, HierarchyError> {
        if !self.entities.contains_key(parent) {
            return Err(HierarchyError::UnknownEntity(parent));
        }
        let id = self.insert(name, transform);
        if let Some(entity) = self.entities.get_mut(id) {
            entity.transform_mut().set_parent_unchecked(Some(parent));
        }
        Ok(id)
    }

    /// Replace the active list
    pub(crate) fn set_order(&mut self, order: Vec<EntityId>) {
        self.order = order;
    }

    /// Drop every entity. Ids handed out before never resolve again.
    pub(crate) fn clear(&mut self) {
        self.entities.clear();
        self.order.clear();
    }

    /// Entity by id
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Entity by id, mutably
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Whether the id resolves in this world
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Active entity ids in update order
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Active entities in update order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(*id))
    }

    /// Number of active entities
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether there are no active entities
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// First active entity with the given name
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.iter().find(|e| e.name() == name).map(Entity::id)
    }

    /// Active entities with an enabled behavior of type `T`, in update order
    pub fn get_objects_with_component<T: Behavior>(&self) -> Vec<EntityId> {
        self.iter()
            .filter(|e| e.has_component::<T>())
            .map(Entity::id)
            .collect()
    }

    //--- Hierarchy -----------------------------------------------------------

    /// Re-parent `child`; `None` makes it a root.
    ///
    /// Rejected if either entity is unknown or if `parent` is `child` or one
    /// of its descendants.
    pub fn set_parent(
        &mut self,
        child: EntityId,
        parent: Option<EntityId>,
    ) -> Result<(), HierarchyError> {
        if !self.contains(child) {
            return Err(HierarchyError::UnknownEntity(child));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(HierarchyError::UnknownEntity(parent));
            }
            if self.ancestors_inclusive(parent).any(|id| id == child) {
                log::error!("Rejected parent link {child:?} -> {parent:?}: cycle");
                return Err(HierarchyError::Cycle { child, parent });
            }
        }
        if let Some(entity) = self.entities.get_mut(child) {
            entity.transform_mut().set_parent_unchecked(parent);
        }
        Ok(())
    }

    /// Parent of `id`
    pub fn parent_of(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(id).and_then(|e| e.transform().parent())
    }

    /// `id` followed by each of its ancestors up to the root
    pub fn ancestors_inclusive(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        std::iter::successors(Some(id), move |current| self.parent_of(*current))
    }

    /// Direct children of `id`, in update order
    pub fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        self.iter()
            .filter(|e| e.transform().parent() == Some(id))
            .map(Entity::id)
            .collect()
    }

    /// First direct child of `id` carrying an enabled `T`
    pub fn find_child_with_component<T: Behavior>(&self, id: EntityId) -> Option<EntityId> {
        self.iter()
            .filter(|e| e.transform().parent() == Some(id))
            .find(|e| e.has_component::<T>())
            .map(Entity::id)
    }

    /// Tree of the active entities built from their parent links
    pub fn hierarchy(&self) -> HierarchyTree {
        HierarchyTree::build(self)
    }

    //--- Spatial queries -----------------------------------------------------

    /// World-space position of `id`
    pub fn world_position(&self, id: EntityId) -> Option<Vec3> {
        self.transform(id).map(|t| t.world_position(self))
    }

    /// World-space rotation of `id`
    pub fn world_rotation(&self, id: EntityId) -> Option<Quat> {
        self.transform(id).map(|t| t.world_rotation(self))
    }

    /// Model matrix of `id`
    pub fn model_matrix(&self, id: EntityId) -> Option<Mat4> {
        self.transform(id).map(|t| t.model_matrix(self))
    }

    /// Move `id` by `delta` rotated into its world orientation
    pub fn move_with_rotation(&mut self, id: EntityId, delta: Vec3) {
        let Some(rotated) = self.world_rotation(id).map(|rotation| rotation * delta) else {
            return;
        };
        if let Some(entity) = self.entities.get_mut(id) {
            entity.transform_mut().move_by(rotated);
        }
    }

    //--- Dispatch ------------------------------------------------------------

    /// Capture which entities and behaviors a pass will reach.
    ///
    /// Flags toggled while the pass runs take effect on the next pass.
    pub(crate) fn snapshot_pass(&self, filter: DispatchFilter, require_enabled_entity: bool) -> Vec<PassEntry> {
        self.iter()
            .filter(|e| !require_enabled_entity || e.is_enabled())
            .map(|e| PassEntry {
                entity: e.id(),
                mask: e
                    .components()
                    .iter()
                    .map(|slot| match filter {
                        DispatchFilter::All => true,
                        DispatchFilter::Enabled => slot.is_enabled(),
                        DispatchFilter::Update(mode) => {
                            slot.is_enabled() && (!mode.is_editor() || slot.runs_in_editor())
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    /// Run `hook` on the behaviors of `entry` admitted by its mask.
    ///
    /// The entity's component list is detached for the duration so each
    /// behavior can reach the world and its siblings. Behaviors attached
    /// while the list is detached are appended afterwards and first run on
    /// the next pass.
    pub(crate) fn dispatch<F>(
        &mut self,
        entry: &PassEntry,
        frame: &FrameInfo<'_>,
        scene_request: &mut Option<SceneRef>,
        mut hook: F,
    ) where
        F: FnMut(&mut dyn Behavior, &mut BehaviorContext<'_>),
    {
        let id = entry.entity;
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let mut slots = std::mem::take(&mut entity.components);

        for (index, admitted) in entry.mask.iter().enumerate() {
            if !*admitted || index >= slots.len() {
                continue;
            }
            let (before, rest) = slots.split_at_mut(index);
            let Some((current, after)) = rest.split_first_mut() else {
                break;
            };
            let mut ctx = BehaviorContext::new(
                id,
                self,
                Siblings::new(before, after),
                frame,
                scene_request,
            );
            hook(current.behavior_mut(), &mut ctx);
        }

        if let Some(entity) = self.entities.get_mut(id) {
            let added = std::mem::replace(&mut entity.components, slots);
            entity.components.extend(added);
        }
    }

    fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.entities.get(id).map(Entity::transform)
    }
}

impl TransformLookup for World {
    fn transform(&self, entity: EntityId) -> Option<&Transform> {
        self.entities.get(entity).map(Entity::transform)
    }
}

impl PassEntry {
    /// Single-entity entry reaching every behavior
    pub(crate) fn all(world: &World, entity: EntityId) -> Option<Self> {
        world.entity(entity).map(|e| Self {
            entity,
            mask: vec![true; e.components().len()],
        })
    }
}
