//! Persistent companion memory: the session memory document, the in-session
//! transcript and the append-only conversation and relationship logs.

pub mod conversation;
pub mod error;
mod jsonl;
pub mod model;
pub mod policy;
pub mod relationship;
pub mod store;

/// Conversation log and its rows.
pub use conversation::{ConversationEntry, ConversationLog};
/// Memory error type.
pub use error::MemoryError;
/// Memory document and transcript models.
pub use model::{
    ChatTurn, ConversationPatterns, ImportantTopic, MemorySummary, MoodChange, SessionMemory,
    SessionSummary, TurnRole,
};
/// Retention limits.
pub use policy::{LogRetentionPolicy, MemoryRetentionPolicy};
/// Relationship snapshot log.
pub use relationship::{RelationshipLog, RelationshipSnapshot};
/// File-backed session memory.
pub use store::MemoryStore;
