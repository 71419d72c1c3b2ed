//! Append-only conversation log with bounded retention.

use crate::error::MemoryError;
use crate::jsonl::{append_record, count_records, read_records, write_records};
use crate::policy::LogRetentionPolicy;
use chrono::{DateTime, Local, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One completed exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub assistant_response: String,
    pub mood: String,
    /// Backend and model that produced the response.
    pub model_info: String,
    /// Local calendar day, `YYYYMMDD`.
    pub session_id: String,
}

impl ConversationEntry {
    /// Build an entry stamped now, with a session id for the local day.
    pub fn new(
        user_message: impl Into<String>,
        assistant_response: impl Into<String>,
        mood: impl Into<String>,
        model_info: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            user_message: user_message.into(),
            assistant_response: assistant_response.into(),
            mood: mood.into(),
            model_info: model_info.into(),
            session_id: Local::now().format("%Y%m%d").to_string(),
        }
    }
}

/// JSONL log of exchanges, compacted to the newest rows past the retention cap.
#[derive(Debug)]
pub struct ConversationLog {
    path: PathBuf,
    policy: LogRetentionPolicy,
    len: usize,
}

impl ConversationLog {
    pub fn open(path: impl AsRef<Path>, policy: LogRetentionPolicy) -> Self {
        let path = path.as_ref().to_path_buf();
        let len = count_records(&path).unwrap_or_else(|err| {
            warn!(
                "failed to count conversation log (path={}, error={})",
                path.display(),
                err
            );
            0
        });
        debug!(
            "conversation log opened (path={}, rows={})",
            path.display(),
            len
        );
        Self { path, policy, len }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows currently in the log.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one entry and compact when the cap is exceeded.
    pub fn append(&mut self, entry: &ConversationEntry) -> Result<(), MemoryError> {
        append_record(&self.path, entry)?;
        self.len += 1;
        if let Some(max) = self.policy.max_entries
            && self.len > max
        {
            self.compact(max)?;
        }
        Ok(())
    }

    /// Read every entry, oldest first.
    pub fn entries(&self) -> Result<Vec<ConversationEntry>, MemoryError> {
        read_records(&self.path)
    }

    fn compact(&mut self, max: usize) -> Result<(), MemoryError> {
        let mut entries: Vec<ConversationEntry> = read_records(&self.path)?;
        let removed = entries.len().saturating_sub(max);
        entries.drain(..removed);
        write_records(&self.path, &entries)?;
        self.len = entries.len();
        info!(
            "conversation log compacted (path={}, removed={}, remaining={})",
            self.path.display(),
            removed,
            self.len
        );
        Ok(())
    }
}
