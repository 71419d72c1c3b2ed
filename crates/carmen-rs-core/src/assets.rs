//! Avatar and ambient sound lookup keyed by mood.

use crate::mood::MoodInfo;
use std::path::{Path, PathBuf};

/// Source of avatar clips.
pub trait FrameSource: Send + Sync {
    /// Avatar clip for the mood, if one is available.
    fn avatar(&self, mood: &MoodInfo) -> Option<PathBuf>;
}

/// Source of ambient sound loops.
pub trait AudioSource: Send + Sync {
    /// Ambient loop for the mood, if one is available.
    fn ambient(&self, mood: &MoodInfo) -> Option<PathBuf>;
}

/// Assets resolved from an avatars directory and a sounds directory.
#[derive(Debug, Clone)]
pub struct AssetDirectory {
    avatars: PathBuf,
    sounds: PathBuf,
}

impl AssetDirectory {
    pub fn new(avatars: impl AsRef<Path>, sounds: impl AsRef<Path>) -> Self {
        Self {
            avatars: avatars.as_ref().to_path_buf(),
            sounds: sounds.as_ref().to_path_buf(),
        }
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}

impl FrameSource for AssetDirectory {
    fn avatar(&self, mood: &MoodInfo) -> Option<PathBuf> {
        existing(self.avatars.join(mood.avatar))
    }
}

impl AudioSource for AssetDirectory {
    fn ambient(&self, mood: &MoodInfo) -> Option<PathBuf> {
        existing(self.sounds.join(mood.ambient_sound))
    }
}

/// No assets at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAssets;

impl FrameSource for NullAssets {
    fn avatar(&self, _mood: &MoodInfo) -> Option<PathBuf> {
        None
    }
}

impl AudioSource for NullAssets {
    fn ambient(&self, _mood: &MoodInfo) -> Option<PathBuf> {
        None
    }
}
