//! Scene management
//!
//! A scene is a document describing a tree of entities. The
//! [`SceneManager`] resolves documents through a [`SceneSource`],
//! instantiates them into the [`World`](crate::ecs::World) and drives the
//! frame loop over the result.

pub mod description;
pub mod hierarchy;
pub mod scene_manager;
pub mod source;

#[cfg(test)]
mod tests;

pub use description::{ComponentDesc, EntityNode, SceneDocument};
pub use hierarchy::HierarchyTree;
pub use scene_manager::{FrameStats, SceneManager, SceneState};
pub use source::{DirectorySceneSource, MemorySceneSource, SceneEntry, SceneSource};

use std::fmt;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::ecs::{ComponentError, FieldError, RegistryError};

/// Identity of a loaded scene
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneInfo {
    name: String,
    index: usize,
}

impl SceneInfo {
    /// Create scene info
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the scene in the discovery order
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for SceneInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.name, self.index)
    }
}

/// A scene addressed by discovery index or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneRef {
    /// Position in the discovery order
    Index(usize),
    /// Scene name
    Name(String),
}

impl From<usize> for SceneRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for SceneRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for SceneRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for SceneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Scene errors
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// No scene with this name or index
    #[error("scene {0} not found")]
    NotFound(SceneRef),

    /// Reading the scene root or a scene file failed
    #[error("IO error reading {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The scene document could not be parsed
    #[error("malformed scene document '{scene}': {source}")]
    Malformed {
        /// Scene name
        scene: String,
        /// Parser error
        source: ConfigError,
    },
}

/// Non-fatal problem found while instantiating a scene
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// The component's type is not registered; the component was skipped
    #[error("{entity}: {source}")]
    UnresolvedBehavior {
        /// Entity name
        entity: String,
        /// Registry lookup failure
        source: RegistryError,
    },

    /// A field value could not be applied; the rest of the component was kept
    #[error("{entity}: {source}")]
    RejectedField {
        /// Entity name
        entity: String,
        /// Field failure
        source: FieldError,
    },

    /// The component's `active` value was not a boolean; it stays enabled
    #[error("{entity}: {source}")]
    InvalidActiveFlag {
        /// Entity name
        entity: String,
        /// Flag failure
        source: ComponentError,
    },

    /// The node's material is unknown; the default material was used
    #[error("{entity}: unknown material '{material}'")]
    UnknownMaterial {
        /// Entity name
        entity: String,
        /// Requested material
        material: String,
    },

    /// Neither the node's material nor the default material exist
    #[error("{entity}: default material '{material}' is not registered")]
    MissingDefaultMaterial {
        /// Entity name
        entity: String,
        /// Default material name
        material: String,
    },
}

/// Outcome of a successful scene load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// The scene now active
    pub scene: SceneInfo,
    /// Number of entities instantiated
    pub entities: usize,
    /// Problems that degraded, but did not abort, the load
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    /// Whether the load produced no warnings
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
