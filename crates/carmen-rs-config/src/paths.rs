//! Layout of the per-user data directory.

use directories::UserDirs;
use std::path::{Path, PathBuf};

/// Directory name created under the home directory.
pub const DEFAULT_DATA_DIR: &str = ".carmen";

/// Paths of every file and directory the companion reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirs {
    root: PathBuf,
}

impl DataDirs {
    /// Use an explicit root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Default root under the home directory (`~/.carmen`).
    pub fn user_default() -> Option<Self> {
        UserDirs::new().map(|dirs| Self::new(dirs.home_dir().join(DEFAULT_DATA_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config").join("companion_config.json")
    }

    pub fn memory_file(&self) -> PathBuf {
        self.root.join("data").join("session_memory.json")
    }

    pub fn relationship_log(&self) -> PathBuf {
        self.root.join("data").join("relationship_log.jsonl")
    }

    pub fn conversation_log(&self) -> PathBuf {
        self.root.join("logs").join("conversations.jsonl")
    }

    /// Diagnostic log written while the terminal UI owns the screen.
    pub fn log_file(&self) -> PathBuf {
        self.root.join("logs").join("carmen.log")
    }

    pub fn avatars_dir(&self) -> PathBuf {
        self.root.join("assets").join("avatars")
    }

    pub fn sounds_dir(&self) -> PathBuf {
        self.root.join("assets").join("sounds")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("exports")
    }
}

#[cfg(test)]
mod tests {
    use super::DataDirs;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn paths_live_under_root() {
        let dirs = DataDirs::new("/tmp/carmen");
        assert_eq!(
            dirs.config_file(),
            Path::new("/tmp/carmen/config/companion_config.json")
        );
        assert_eq!(
            dirs.memory_file(),
            Path::new("/tmp/carmen/data/session_memory.json")
        );
        assert_eq!(
            dirs.conversation_log(),
            Path::new("/tmp/carmen/logs/conversations.jsonl")
        );
        assert!(dirs.sounds_dir().starts_with(dirs.root()));
    }
}
