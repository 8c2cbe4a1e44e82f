//! Engine facade
//!
//! Ties configuration, the input snapshot and the scene manager into one
//! frame loop. Windowing and drawing stay outside; a host feeds input through
//! an [`InputSource`] and calls [`Engine::frame`] once per displayed frame.

use std::path::Path;

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::core::EngineConfig;
use crate::ecs::BehaviorRegistry;
use crate::input::{InputSource, InputState, NullInputSource};
use crate::scene::{
    DirectorySceneSource, FrameStats, LoadReport, SceneError, SceneManager, SceneSource,
};

/// Main engine struct
pub struct Engine {
    config: EngineConfig,
    scenes: SceneManager,
    input: InputState,
    input_source: Box<dyn InputSource>,
}

impl Engine {
    /// Create an engine over an already constructed scene manager
    pub fn new(config: EngineConfig, scenes: SceneManager) -> Self {
        Self {
            config,
            scenes,
            input: InputState::new(),
            input_source: Box::new(NullInputSource),
        }
    }

    /// Create an engine reading scenes from `config.scene_root`
    pub fn from_config(config: EngineConfig, registry: BehaviorRegistry) -> Result<Self, EngineError> {
        let source = DirectorySceneSource::new(&config.scene_root);
        Self::with_source(config, Box::new(source), registry)
    }

    /// Create an engine over any scene source
    pub fn with_source(
        config: EngineConfig,
        source: Box<dyn SceneSource>,
        registry: BehaviorRegistry,
    ) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        let scenes = SceneManager::new(&config, source, registry)?;
        Ok(Self::new(config, scenes))
    }

    /// Load the configuration at `path` (defaults when the file is missing)
    /// and read scenes from its scene root
    pub fn from_config_file(path: impl AsRef<Path>, registry: BehaviorRegistry) -> Result<Self, EngineError> {
        let config = EngineConfig::load_or_default(path)?;
        Self::from_config(config, registry)
    }

    /// Builder pattern: Replace the input source
    pub fn with_input_source(mut self, source: impl InputSource + 'static) -> Self {
        self.input_source = Box::new(source);
        self
    }

    /// Load the configured initial scene, if any
    pub fn start(&mut self) -> Result<Option<LoadReport>, EngineError> {
        let Some(index) = self.config.initial_scene else {
            log::info!("No initial scene configured");
            return Ok(None);
        };
        if self.scenes.scene_count() == 0 {
            log::warn!("No scenes found, nothing to start");
            return Ok(None);
        }
        Ok(Some(self.scenes.load_scene(index)?))
    }

    /// Refresh input and run one frame
    pub fn frame(&mut self) -> FrameStats {
        self.input.begin_frame();
        self.input_source.poll(&mut self.input);
        self.scenes.tick(&self.input)
    }

    /// Run `frames` frames, returning the stats of the last one
    pub fn run_frames(&mut self, frames: u32) -> Option<FrameStats> {
        let mut last = None;
        for _ in 0..frames {
            let stats = self.frame();
            if let Some(Err(err)) = &stats.scene_change {
                log::error!("Scene change failed: {err}");
            }
            last = Some(stats);
        }
        last
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scene manager
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    /// Scene manager, mutably
    pub fn scenes_mut(&mut self) -> &mut SceneManager {
        &mut self.scenes
    }

    /// Input snapshot of the current frame
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Input snapshot, mutably, for hosts that push events directly
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene discovery or loading failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::CubeCollider;
    use crate::foundation::time::ManualClock;
    use crate::input::KeyCode;
    use crate::scene::{ComponentDesc, EntityNode, MemorySceneSource, SceneDocument};
    use std::time::Duration;

    struct Scripted {
        frame: u32,
    }

    impl InputSource for Scripted {
        fn poll(&mut self, input: &mut InputState) {
            self.frame += 1;
            input.handle_key_input(KeyCode::Space, self.frame == 1);
        }
    }

    fn source() -> MemorySceneSource {
        MemorySceneSource::new().with_scene(
            "start",
            SceneDocument {
                objects: vec![EntityNode::new("box", [0.0; 3]).with_component(ComponentDesc::new("CubeCollider"))],
            },
        )
    }

    #[test]
    fn test_start_loads_initial_scene() {
        let mut engine =
            Engine::with_source(EngineConfig::default(), Box::new(source()), BehaviorRegistry::with_builtins())
                .unwrap();

        let report = engine.start().unwrap().unwrap();
        assert_eq!(report.scene.name(), "start");
        assert_eq!(engine.scenes().get_objects_with_component::<CubeCollider>().len(), 1);
    }

    #[test]
    fn test_start_without_initial_scene() {
        let config = EngineConfig::default().with_initial_scene(None);
        let mut engine =
            Engine::with_source(config, Box::new(source()), BehaviorRegistry::with_builtins()).unwrap();

        assert!(engine.start().unwrap().is_none());
        assert!(engine.scenes().active_scene().is_none());
    }

    #[test]
    fn test_frame_polls_input_before_tick() {
        let clock = ManualClock::new();
        let scenes = SceneManager::new(
            &EngineConfig::default(),
            Box::new(source()),
            BehaviorRegistry::with_builtins(),
        )
        .unwrap()
        .with_clock(clock.clone());
        let mut engine = Engine::new(EngineConfig::default(), scenes).with_input_source(Scripted { frame: 0 });
        engine.start().unwrap();

        clock.advance(Duration::from_millis(40));
        let stats = engine.frame();
        assert_eq!(stats.fixed_steps, 2);
        assert!(engine.input().get_key_down(KeyCode::Space));

        engine.frame();
        assert!(engine.input().get_key_up(KeyCode::Space));

        let last = engine.run_frames(3).unwrap();
        assert_eq!(last.frame, 5);
    }

    #[test]
    fn test_missing_scene_root_is_an_error() {
        let config = EngineConfig::default().with_scene_root("/definitely/not/here");
        let result = Engine::from_config(config, BehaviorRegistry::with_builtins());
        assert!(matches!(result, Err(EngineError::Scene(SceneError::Io { .. }))));
    }
}
