//! File-backed session memory and the in-session transcript.

use crate::error::MemoryError;
use crate::jsonl::temp_path;
use crate::model::{
    ChatTurn, ImportantTopic, MemorySummary, MoodChange, SessionMemory, SessionSummary, TurnRole,
};
use crate::policy::MemoryRetentionPolicy;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Owns the memory document and the transcript of the running session.
///
/// Single writer: every mutation that touches the document persists it
/// through a temp-file rename. Persistence failures are logged and never
/// interrupt the conversation.
#[derive(Debug)]
pub struct MemoryStore {
    path: PathBuf,
    policy: MemoryRetentionPolicy,
    memory: SessionMemory,
    turns: Vec<ChatTurn>,
}

impl MemoryStore {
    /// Open the store, falling back to an empty document on any read failure.
    pub fn load(path: impl AsRef<Path>, policy: MemoryRetentionPolicy) -> Self {
        let path = path.as_ref().to_path_buf();
        let memory = match read_document(&path) {
            Ok(memory) => memory,
            Err(MemoryError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                info!("memory missing, starting fresh (path={})", path.display());
                SessionMemory::default()
            }
            Err(err) => {
                warn!(
                    "memory unusable, starting fresh (path={}, error={})",
                    path.display(),
                    err
                );
                SessionMemory::default()
            }
        };
        Self::with_memory(path, policy, memory)
    }

    /// Open the store, propagating read and decode failures.
    pub fn try_load(
        path: impl AsRef<Path>,
        policy: MemoryRetentionPolicy,
    ) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        let memory = read_document(&path)?;
        Ok(Self::with_memory(path, policy, memory))
    }

    fn with_memory(path: PathBuf, policy: MemoryRetentionPolicy, mut memory: SessionMemory) -> Self {
        truncate_front(&mut memory.recent, policy.max_recent);
        truncate_front(&mut memory.sessions, policy.max_sessions);
        truncate_front(&mut memory.mood_history, policy.max_mood_history);
        truncate_front(
            &mut memory.patterns.conversation_times,
            policy.max_conversation_times,
        );
        debug!(
            "memory loaded (path={}, recent={}, sessions={})",
            path.display(),
            memory.recent.len(),
            memory.sessions.len()
        );
        Self {
            path,
            policy,
            memory,
            turns: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn policy(&self) -> &MemoryRetentionPolicy {
        &self.policy
    }

    /// Push an utterance onto `recent`, keep the newest entries and persist.
    pub fn append_recent(&mut self, utterance: impl Into<String>) -> bool {
        self.memory.recent.push(utterance.into());
        truncate_front(&mut self.memory.recent, self.policy.max_recent);
        self.save()
    }

    /// Replace `recent` with the newest of `utterances` and persist.
    pub fn flush_recent(&mut self, utterances: &[String]) -> bool {
        let start = utterances.len().saturating_sub(self.policy.max_recent);
        self.memory.recent = utterances[start..].to_vec();
        self.save()
    }

    /// Append a transcript turn, dropping the oldest beyond the turn cap.
    pub fn record_turn(&mut self, role: TurnRole, text: impl Into<String>) -> &ChatTurn {
        self.turns.push(ChatTurn::now(role, text));
        truncate_front(&mut self.turns, self.policy.max_turns);
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Drop the transcript; the memory document is untouched.
    pub fn clear_turns(&mut self) {
        debug!("transcript cleared (turns={})", self.turns.len());
        self.turns.clear();
    }

    /// Record a finished session and persist.
    pub fn record_session(&mut self, summary: SessionSummary) -> bool {
        self.memory.sessions.push(summary);
        truncate_front(&mut self.memory.sessions, self.policy.max_sessions);
        self.save()
    }

    /// Record a mood selection and persist.
    pub fn record_mood(&mut self, mood: impl Into<String>) -> bool {
        self.memory.mood_history.push(MoodChange {
            mood: mood.into(),
            timestamp: Utc::now(),
        });
        truncate_front(&mut self.memory.mood_history, self.policy.max_mood_history);
        self.save()
    }

    /// Fold one user message into the long-term aggregates and persist.
    ///
    /// Each topic gains a mention and a frequency count; `mood` becomes the
    /// typical mood and the message time is kept up to the policy cap.
    pub fn record_conversation(&mut self, topics: &[&str], mood: &str) -> bool {
        let now = Utc::now();
        for topic in topics {
            self.mention_topic(topic, now);
            *self
                .memory
                .patterns
                .frequent_topics
                .entry(topic.to_string())
                .or_insert(0) += 1;
        }
        let patterns = &mut self.memory.patterns;
        patterns.typical_mood = mood.to_string();
        patterns.conversation_times.push(now);
        truncate_front(
            &mut patterns.conversation_times,
            self.policy.max_conversation_times,
        );
        self.save()
    }

    /// Count a mention of `topic`, merging case-insensitively, and persist.
    pub fn add_important_topic(&mut self, topic: &str) -> bool {
        self.mention_topic(topic, Utc::now());
        self.save()
    }

    fn mention_topic(&mut self, topic: &str, now: DateTime<Utc>) {
        let existing = self
            .memory
            .important_topics
            .iter_mut()
            .find(|known| known.topic.eq_ignore_ascii_case(topic));
        match existing {
            Some(known) => {
                known.mentions += 1;
                known.last_mentioned = now;
            }
            None => self.memory.important_topics.push(ImportantTopic {
                topic: topic.to_string(),
                mentions: 1,
                first_mentioned: now,
                last_mentioned: now,
            }),
        }
    }

    /// Digest of the long-term memory.
    pub fn summary(&self) -> MemorySummary {
        let mut most_frequent: Vec<(String, u32)> = self
            .memory
            .patterns
            .frequent_topics
            .iter()
            .map(|(topic, count)| (topic.clone(), *count))
            .collect();
        most_frequent.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        most_frequent.truncate(5);
        let moods = &self.memory.mood_history;
        MemorySummary {
            total_conversations: self.memory.patterns.conversation_times.len(),
            important_topics_count: self.memory.important_topics.len(),
            moods_tracked: moods.len(),
            most_frequent_topics: most_frequent,
            recent_moods: moods[moods.len().saturating_sub(10)..]
                .iter()
                .map(|change| change.mood.clone())
                .collect(),
        }
    }

    /// Set a preference and persist.
    pub fn set_preference(&mut self, key: impl Into<String>, value: serde_json::Value) -> bool {
        self.memory.preferences.insert(key.into(), value);
        self.save()
    }

    pub fn preference(&self, key: &str) -> Option<&serde_json::Value> {
        self.memory.preferences.get(key)
    }

    /// Persist the document, logging instead of returning failures.
    pub fn save(&self) -> bool {
        match self.try_save() {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "failed to save memory (path={}, error={})",
                    self.path.display(),
                    err
                );
                false
            }
        }
    }

    /// Persist the document through a temp file and rename.
    pub fn try_save(&self) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut contents = serde_json::to_string_pretty(&self.memory)?;
        contents.push('\n');
        let temp_path = temp_path(&self.path);
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(temp_path, &self.path)?;
        debug!("memory saved (path={})", self.path.display());
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<SessionMemory, MemoryError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Keep only the last `max` items.
fn truncate_front<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        let excess = items.len() - max;
        items.drain(..excess);
    }
}
