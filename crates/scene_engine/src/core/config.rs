//! # Engine Configuration
//!
//! Runtime settings for the scene core. Loaded through the [`Config`] trait
//! from `.toml` or `.ron`, with defaults matching the engine's historical
//! behavior (50 Hz fixed step, `base_mat` fallback material, first scene
//! loaded at startup).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;

/// How the runtime is being hosted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Normal game execution
    #[default]
    Runtime,
    /// Hosted inside the editor: only run-in-editor behaviors update and
    /// scene load/unload hooks are not dispatched
    Editor,
}

impl ExecutionMode {
    /// Whether this is the editor mode
    pub fn is_editor(self) -> bool {
        matches!(self, Self::Editor)
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed-update rate in steps per second
    pub fixed_update_hz: u32,

    /// Runtime or editor hosting
    pub execution_mode: ExecutionMode,

    /// Directory searched for scene documents (filesystem source)
    pub scene_root: PathBuf,

    /// Material used when a node names none or names an unknown one
    pub default_material: String,

    /// Scene index loaded when the engine starts
    pub initial_scene: Option<usize>,

    /// Default `env_logger` filter used by binaries
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_update_hz: 50,
            execution_mode: ExecutionMode::Runtime,
            scene_root: PathBuf::from("assets"),
            default_material: "base_mat".to_string(),
            initial_scene: Some(0),
            log_filter: "info".to_string(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Set the fixed-update rate
    pub fn with_fixed_update_hz(mut self, hz: u32) -> Self {
        self.fixed_update_hz = hz;
        self
    }

    /// Set the execution mode
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    /// Set the scene root directory
    pub fn with_scene_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scene_root = root.into();
        self
    }

    /// Set the fallback material name
    pub fn with_default_material(mut self, name: impl Into<String>) -> Self {
        self.default_material = name.into();
        self
    }

    /// Set (or clear) the scene loaded at startup
    pub fn with_initial_scene(mut self, index: Option<usize>) -> Self {
        self.initial_scene = index;
        self
    }
}
