//! Parent/child tree of the active entities, for tooling

use crate::ecs::{EntityId, World};

/// One level of the entity tree. The root has no entity; every other node
/// holds one entity and its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyTree {
    entity: Option<EntityId>,
    children: Vec<HierarchyTree>,
}

impl HierarchyTree {
    /// Build the tree by walking each active entity's parent chain.
    ///
    /// Entities that share ancestors share the corresponding prefix of the
    /// tree. Siblings appear in the order they are first reached.
    pub fn build(world: &World) -> Self {
        let mut root = Self::default();
        for &id in world.ids() {
            let mut path: Vec<EntityId> = world.ancestors_inclusive(id).collect();
            path.reverse();

            let mut place = &mut root;
            for entity in path {
                place = place.child_or_insert(entity);
            }
        }
        root
    }

    fn child_or_insert(&mut self, entity: EntityId) -> &mut Self {
        let index = match self.children.iter().position(|c| c.entity == Some(entity)) {
            Some(index) => index,
            None => {
                self.children.push(Self {
                    entity: Some(entity),
                    children: Vec::new(),
                });
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Entity at this node; `None` for the root
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// Direct children
    pub fn children(&self) -> &[HierarchyTree] {
        &self.children
    }

    /// Child node holding `entity`
    pub fn child(&self, entity: EntityId) -> Option<&HierarchyTree> {
        self.children.iter().find(|c| c.entity == Some(entity))
    }

    /// Node for `entity` anywhere below this one
    pub fn find(&self, entity: EntityId) -> Option<&HierarchyTree> {
        self.children
            .iter()
            .find_map(|c| if c.entity == Some(entity) { Some(c) } else { c.find(entity) })
    }

    /// Number of entity nodes below this one
    pub fn len(&self) -> usize {
        self.children.iter().map(|c| 1 + c.len()).sum()
    }

    /// Whether this node has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Entities in depth-first pre-order
    pub fn depth_first(&self) -> Vec<EntityId> {
        let mut out = Vec::with_capacity(self.len());
        self.collect(&mut out);
        out
    }

    fn collect(&self, out: &mut Vec<EntityId>) {
        for child in &self.children {
            out.extend(child.entity);
            child.collect(out);
        }
    }
}
