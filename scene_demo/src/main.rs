//! Headless scene demo
//!
//! Loads the scenes under `assets/`, then steps the engine at a simulated
//! 60 frames per second: a crate falls onto the floor of the arena, the
//! arena hands over to the menu, and the menu hands back.
//!
//! Configuration is read from `scene_demo.toml` in the working directory
//! when present.

mod behaviors;

use std::path::PathBuf;
use std::time::Duration;

use scene_engine::config::{Config, ConfigError};
use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use thiserror::Error;

const CONFIG_FILE: &str = "scene_demo.toml";
const FRAME_TIME: Duration = Duration::from_nanos(16_666_667);
const FRAMES: u32 = 600;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

fn bundled_assets() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn materials() -> MaterialLibrary {
    MaterialLibrary::new()
        .with("base_mat", scene_engine::render::NullMaterial)
        .with("metal", scene_engine::render::NullMaterial)
}

fn main() -> Result<(), DemoError> {
    let config = EngineConfig::load_or_default(CONFIG_FILE)?;
    logging::init_with_filter(&config.log_filter);

    let config = if config.scene_root.is_relative() && !config.scene_root.exists() {
        let bundled = bundled_assets();
        log::info!("Using bundled scenes at {}", bundled.display());
        config.with_scene_root(bundled)
    } else {
        config
    };

    let clock = ManualClock::new();
    let source = DirectorySceneSource::new(&config.scene_root);
    let scenes = SceneManager::new(&config, Box::new(source), behaviors::registry())
        .map_err(EngineError::from)?
        .with_clock(clock.clone())
        .with_materials(materials());

    let mut engine = Engine::new(config, scenes);
    log::info!(
        "Scenes: {}",
        engine.scenes().scene_names().collect::<Vec<_>>().join(", ")
    );

    if let Some(report) = engine.start()? {
        for warning in &report.warnings {
            log::warn!("{warning}");
        }
    }

    let mut fixed_steps = 0;
    for _ in 0..FRAMES {
        clock.advance(FRAME_TIME);
        let stats = engine.frame();
        fixed_steps += stats.fixed_steps;
        match stats.scene_change {
            Some(Ok(report)) => log::info!(
                "Frame {}: now in {} ({} entities)",
                stats.frame,
                report.scene,
                report.entities
            ),
            Some(Err(err)) => log::error!("Frame {}: scene change failed: {err}", stats.frame),
            None => {}
        }
    }

    log::info!(
        "Ran {FRAMES} frames, {fixed_steps} fixed steps, ending in {}",
        engine
            .scenes()
            .active_scene()
            .map_or_else(|| "no scene".to_string(), ToString::to_string)
    );
    Ok(())
}
