//! Scene document schema
//!
//! ```ron
//! (
//!     objects: [
//!         (
//!             name: "player",
//!             pos: (0.0, 1.0, 0.0),
//!             rot: (0.0, 90.0, 0.0),
//!             scale: (1.0, 1.0, 1.0),
//!             material: Some("metal"),
//!             components: [
//!                 (type: "CubeCollider", fields: {"trigger_collider": true}),
//!             ],
//!             children: [],
//!         ),
//!     ],
//! )
//! ```
//!
//! The same structure is accepted as TOML (`[[objects]]` tables).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ecs::{FieldValue, Transform};
use crate::foundation::math::Vec3;

/// A whole scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Root nodes
    #[serde(default)]
    pub objects: Vec<EntityNode>,
}

impl SceneDocument {
    /// Total number of nodes, children included
    pub fn node_count(&self) -> usize {
        fn count(node: &EntityNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.objects.iter().map(count).sum()
    }
}

/// One entity and its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    /// Entity name
    pub name: String,
    /// Local position
    pub pos: [f32; 3],
    /// Local Euler rotation in degrees
    pub rot: [f32; 3],
    /// Scale
    pub scale: [f32; 3],
    /// Material name; the default material when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Behaviors in attachment order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentDesc>,
    /// Child nodes, parented to this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntityNode>,
}

impl EntityNode {
    /// Node at `pos` with no rotation and unit scale
    pub fn new(name: impl Into<String>, pos: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            pos,
            rot: [0.0; 3],
            scale: [1.0; 3],
            material: None,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder pattern: Set the Euler rotation in degrees
    pub fn with_rotation(mut self, rot: [f32; 3]) -> Self {
        self.rot = rot;
        self
    }

    /// Builder pattern: Set the material
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Builder pattern: Append a component
    pub fn with_component(mut self, component: ComponentDesc) -> Self {
        self.components.push(component);
        self
    }

    /// Builder pattern: Append a child node
    pub fn with_child(mut self, child: EntityNode) -> Self {
        self.children.push(child);
        self
    }

    /// Local transform described by this node (no parent)
    pub fn transform(&self) -> Transform {
        Transform::new(
            Vec3::from(self.pos),
            Vec3::from(self.rot),
            Vec3::from(self.scale),
        )
    }
}

/// One behavior on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDesc {
    /// Module namespace of the type; any module when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Registered type identifier
    #[serde(rename = "type", alias = "class")]
    pub type_name: String,
    /// Field values applied through the type's schema
    #[serde(default, alias = "vars", skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldValue>,
    /// Initial enable flag; must be a boolean
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<FieldValue>,
}

impl ComponentDesc {
    /// Component of the given type with default fields
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            module: None,
            type_name: type_name.into(),
            fields: BTreeMap::new(),
            active: None,
        }
    }

    /// Builder pattern: Set the module namespace
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Builder pattern: Set a field value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builder pattern: Set the initial enable value
    pub fn with_active(mut self, active: impl Into<FieldValue>) -> Self {
        self.active = Some(active.into());
        self
    }
}
