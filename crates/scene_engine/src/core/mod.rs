//! # Core Engine Module
//!
//! Shared configuration for the scene runtime.

pub mod config;

pub use config::{EngineConfig, ExecutionMode};
