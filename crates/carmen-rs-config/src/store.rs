//! File-backed config persistence.

use crate::{CompanionConfig, ConfigError};
use log::{debug, info, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Loads and saves the companion config at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, propagating read, parse and validation failures.
    pub fn try_load(&self) -> Result<CompanionConfig, ConfigError> {
        debug!("loading config (path={})", self.path.display());
        let contents = fs::read_to_string(&self.path)?;
        let value: serde_json::Value = json5::from_str(&contents)?;
        let mut config: CompanionConfig = serde_json::from_value(value)?;
        if config.normalize() {
            warn!(
                "config normalized (path={}, temperature={})",
                self.path.display(),
                config.temperature
            );
        }
        config.validate()?;
        Ok(config)
    }

    /// Load the config, falling back to defaults on any failure.
    pub fn load(&self) -> CompanionConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(ConfigError::ReadFailed(err)) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "config missing, using defaults (path={})",
                    self.path.display()
                );
                CompanionConfig::default()
            }
            Err(err) => {
                warn!(
                    "config unusable, using defaults (path={}, error={})",
                    self.path.display(),
                    err
                );
                CompanionConfig::default()
            }
        }
    }

    /// Write the config atomically, creating the parent directory first.
    pub fn try_save(&self, config: &CompanionConfig) -> Result<(), ConfigError> {
        let mut contents = serde_json::to_string_pretty(config)?;
        contents.push('\n');
        write_atomic(&self.path, contents.as_bytes())?;
        debug!(
            "config saved (path={}, mood={}, theme={})",
            self.path.display(),
            config.mood,
            config.theme
        );
        Ok(())
    }

    /// Write the config, logging instead of returning failures.
    ///
    /// Returns false when the write failed.
    pub fn save(&self, config: &CompanionConfig) -> bool {
        match self.try_save(config) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "failed to save config (path={}, error={})",
                    self.path.display(),
                    err
                );
                false
            }
        }
    }
}

/// Replace `path` with `bytes` via a sibling temp file and rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(temp_path, path)
}
