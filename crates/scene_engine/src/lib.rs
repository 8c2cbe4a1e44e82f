//! # Scene Engine
//!
//! Runtime core of a small real-time 3D engine.
//!
//! ## Features
//!
//! - **Transform hierarchy**: Local position/rotation/scale with parent links
//!   and world-space queries
//! - **Behaviors**: Per-entity logic with a fixed set of lifecycle hooks
//! - **Collisions**: Axis-aligned box overlap with enter / stay / exit events
//! - **Scenes**: RON or TOML scene documents instantiated into a world,
//!   driven by a variable-rate update and a 50 Hz fixed step
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! #[derive(Default)]
//! struct Spinner {
//!     speed: f32,
//! }
//!
//! impl Behavior for Spinner {
//!     fn update(&mut self, ctx: &mut BehaviorContext<'_>, dt: f32) {
//!         ctx.rotate_by_degrees(Vec3::new(0.0, self.speed * dt, 0.0));
//!     }
//! }
//!
//! impl RegisteredBehavior for Spinner {
//!     const TYPE_NAME: &'static str = "Spinner";
//!
//!     fn create() -> Self {
//!         Self { speed: 90.0 }
//!     }
//!
//!     fn schema() -> FieldSchema<Self> {
//!         FieldSchema::<Self>::new(Self::TYPE_NAME).float("speed", |s, v| s.speed = v)
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     scene_engine::foundation::logging::init_with_filter("info");
//!
//!     let mut registry = BehaviorRegistry::with_builtins();
//!     registry.register::<Spinner>();
//!
//!     let mut engine = Engine::from_config(EngineConfig::default(), registry)?;
//!     engine.start()?;
//!     engine.run_frames(600);
//!     Ok(())
//! }
//! ```
//!
//! ## Threading
//!
//! Everything runs on one thread. The collision buffers and the behavior
//! registry are mutated without synchronization and the world hands out
//! `Rc` material handles, so none of these types are `Send` or meant to be
//! shared across threads.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

// Runtime
pub mod ecs;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::{EngineConfig, ExecutionMode},
        ecs::{
            components::{Camera, CubeCollider},
            Behavior, BehaviorContext, BehaviorRegistry, Entity, EntityId, FieldSchema,
            FieldValue, RegisteredBehavior, Transform, World,
        },
        foundation::{
            math::{Mat4, Quat, Vec3},
            time::{Clock, ManualClock, SystemClock},
        },
        input::{InputSource, InputState, KeyCode, MouseButton},
        physics::{Aabb, Collider},
        render::{Material, MaterialLibrary, RenderView},
        scene::{
            DirectorySceneSource, MemorySceneSource, SceneDocument, SceneInfo, SceneManager,
            SceneRef,
        },
        Engine, EngineError,
    };
}
