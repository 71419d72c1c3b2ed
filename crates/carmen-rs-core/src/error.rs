//! Error types for the core crate.

use crate::model::ModelError;
use crate::mood::MoodError;
use carmen_rs_config::ConfigError;
use carmen_rs_memory::MemoryError;
use thiserror::Error;

/// Errors returned by core operations that surface to callers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Config error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Memory or log error.
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    /// Text model error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    /// Unknown mood.
    #[error(transparent)]
    Mood(#[from] MoodError),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
