//! Retention limits for memory and logs.

/// Bounds applied to the session memory document and transcript.
#[derive(Debug, Clone)]
pub struct MemoryRetentionPolicy {
    /// Recent user utterances kept for the next welcome message.
    pub max_recent: usize,
    /// In-session transcript turns kept before the oldest are dropped.
    pub max_turns: usize,
    /// Session summaries kept in the memory document.
    pub max_sessions: usize,
    /// Mood changes kept in the memory document.
    pub max_mood_history: usize,
    /// Message timestamps kept in the conversation patterns.
    pub max_conversation_times: usize,
}

impl Default for MemoryRetentionPolicy {
    fn default() -> Self {
        Self {
            max_recent: 5,
            max_turns: 500,
            max_sessions: 50,
            max_mood_history: 100,
            max_conversation_times: 50,
        }
    }
}

/// Bound applied to append-only JSONL logs.
#[derive(Debug, Clone)]
pub struct LogRetentionPolicy {
    /// Rows kept after compaction; `None` keeps everything.
    pub max_entries: Option<usize>,
}

impl Default for LogRetentionPolicy {
    fn default() -> Self {
        Self {
            max_entries: Some(1000),
        }
    }
}

impl LogRetentionPolicy {
    /// Never compact.
    pub fn unbounded() -> Self {
        Self { max_entries: None }
    }
}
