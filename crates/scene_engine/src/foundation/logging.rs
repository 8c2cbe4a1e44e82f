//! Logging utilities
//!
//! The engine only ever talks to the `log` facade. Binaries pick the sink;
//! `env_logger` is the one used by the demo and by these helpers.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a default filter (e.g. `"info"`,
/// `"scene_engine=debug"`). `RUST_LOG` still wins when it is set.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_with_filter(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}
