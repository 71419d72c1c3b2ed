//! Companion configuration: schema, persistence and data directory layout.
//!
//! The config file is a flat JSON document (name, style, mood, theme, ...)
//! with optional `model` and `speech` sections. Loading is fail-soft: a
//! missing or malformed file yields defaults so the companion always starts.

mod error;
mod model;
mod paths;
mod store;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Configuration schema models.
pub use model::*;
/// Data directory layout.
pub use paths::{DEFAULT_DATA_DIR, DataDirs};
/// File-backed config persistence.
pub use store::ConfigStore;
