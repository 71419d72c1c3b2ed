//! Memory document and transcript models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Persisted memory document, one per installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMemory {
    #[serde(default = "default_username")]
    pub username: String,
    /// Last user utterances, most recent last.
    #[serde(default)]
    pub recent: Vec<String>,
    /// Summaries of finished sessions, oldest first.
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
    /// Open-ended user preferences.
    #[serde(default)]
    pub preferences: serde_json::Map<String, serde_json::Value>,
    /// Mood selections, oldest first.
    #[serde(default)]
    pub mood_history: Vec<MoodChange>,
    /// Topics the user keeps coming back to, in first-mention order.
    #[serde(default)]
    pub important_topics: Vec<ImportantTopic>,
    #[serde(default)]
    pub patterns: ConversationPatterns,
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self {
            username: default_username(),
            recent: Vec::new(),
            sessions: Vec::new(),
            preferences: serde_json::Map::new(),
            mood_history: Vec::new(),
            important_topics: Vec::new(),
            patterns: ConversationPatterns::default(),
        }
    }
}

fn default_username() -> String {
    "User".to_string()
}

/// Summary recorded when a session closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Number of user turns in the session.
    pub user_turns: usize,
    /// Mood active at close.
    pub mood: String,
}

/// One mood selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodChange {
    pub mood: String,
    pub timestamp: DateTime<Utc>,
}

/// A topic with its mention count. Topics match case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportantTopic {
    pub topic: String,
    pub mentions: u32,
    pub first_mentioned: DateTime<Utc>,
    pub last_mentioned: DateTime<Utc>,
}

/// Long-term aggregates over every conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationPatterns {
    /// Messages per topic.
    #[serde(default)]
    pub frequent_topics: BTreeMap<String, u32>,
    /// Mood active during the latest message.
    #[serde(default)]
    pub typical_mood: String,
    /// When messages were sent, oldest first.
    #[serde(default)]
    pub conversation_times: Vec<DateTime<Utc>>,
}

/// Read-only digest of the long-term memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySummary {
    /// Messages recorded in `conversation_times`.
    pub total_conversations: usize,
    pub important_topics_count: usize,
    pub moods_tracked: usize,
    /// Up to five topics, most frequent first, ties by name.
    pub most_frequent_topics: Vec<(String, u32)>,
    /// Up to ten latest mood selections, oldest first.
    pub recent_moods: Vec<String>,
}

/// Speaker of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
    /// Controller notices such as command feedback.
    System,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::System => "system",
        };
        f.write_str(label)
    }
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a turn stamped with the current time.
    pub fn now(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SessionMemory;
    use pretty_assertions::assert_eq;

    #[test]
    fn legacy_document_loads_with_defaults() {
        let memory: SessionMemory =
            serde_json::from_str(r#"{"username":"User","recent":["hi"]}"#).expect("decode");
        assert_eq!(memory.recent, vec!["hi".to_string()]);
        assert!(memory.sessions.is_empty());
        assert!(memory.preferences.is_empty());
        assert!(memory.important_topics.is_empty());
        assert_eq!(memory.patterns.typical_mood, "");
    }
}
