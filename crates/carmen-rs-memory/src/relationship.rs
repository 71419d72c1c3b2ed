//! Append-only log of relationship metric snapshots.

use crate::error::MemoryError;
use crate::jsonl::{append_record, count_records, read_records};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Metrics after one enhanced response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSnapshot {
    pub timestamp: DateTime<Utc>,
    pub intimacy_level: f64,
    pub relationship_depth: f64,
    /// Detected tone of the user message.
    pub emotional_state: String,
    /// Mood active when the response was produced.
    pub user_mood: String,
    /// Relationship cue count of the user message.
    pub conversation_depth: usize,
}

/// JSONL file of snapshots, one row per enhancement.
#[derive(Debug, Clone)]
pub struct RelationshipLog {
    path: PathBuf,
}

impl RelationshipLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, snapshot: &RelationshipSnapshot) -> Result<(), MemoryError> {
        append_record(&self.path, snapshot)
    }

    /// Most recent snapshot, if any.
    pub fn latest(&self) -> Result<Option<RelationshipSnapshot>, MemoryError> {
        let mut snapshots: Vec<RelationshipSnapshot> = read_records(&self.path)?;
        Ok(snapshots.pop())
    }

    /// Total rows, i.e. enhanced interactions over the lifetime of the install.
    pub fn count(&self) -> Result<usize, MemoryError> {
        count_records(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::{RelationshipLog, RelationshipSnapshot};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn snapshot(intimacy: f64) -> RelationshipSnapshot {
        RelationshipSnapshot {
            timestamp: Utc::now(),
            intimacy_level: intimacy,
            relationship_depth: 0.05,
            emotional_state: "romantic".to_string(),
            user_mood: "Supportive".to_string(),
            conversation_depth: 1,
        }
    }

    #[test]
    fn latest_returns_last_row() {
        let temp = tempdir().expect("tempdir");
        let log = RelationshipLog::new(temp.path().join("data").join("relationship_log.jsonl"));
        assert_eq!(log.latest().expect("empty"), None);
        assert_eq!(log.count().expect("count"), 0);

        log.append(&snapshot(0.1)).expect("append a");
        log.append(&snapshot(0.2)).expect("append b");
        assert_eq!(log.count().expect("count"), 2);
        assert_eq!(log.latest().expect("latest").expect("row").intimacy_level, 0.2);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("relationship_log.jsonl");
        let log = RelationshipLog::new(&path);
        log.append(&snapshot(0.3)).expect("append");
        let mut contents = fs::read_to_string(&path).expect("read");
        contents.push_str("{broken\n");
        fs::write(&path, contents).expect("write");
        assert_eq!(log.latest().expect("latest").expect("row").intimacy_level, 0.3);
    }
}
