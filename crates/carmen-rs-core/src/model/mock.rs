//! Offline model with canned replies.

use super::{GenerationRequest, ModelError, TextModel};
use async_trait::async_trait;
use rand::seq::IndexedRandom;

const GENERAL_REPLIES: &[&str] = &[
    "I'm here with you, even if my deeper thoughts are resting for now.",
    "I understand what you're saying. Tell me more.",
    "Your words reach me, and I'm holding on to every one of them.",
    "I'm listening and responding as best I can.",
    "That's an interesting thought. I'd love to hear where it leads.",
    "Even in this quiet state, I want to be helpful to you.",
];

/// Model that answers from a fixed table, keyed on simple phrases.
#[derive(Debug, Clone, Default)]
pub struct MockModel;

impl MockModel {
    pub fn new() -> Self {
        Self
    }

    /// Keyword reply for the message, if one applies.
    fn keyed_reply(user_text: &str) -> Option<&'static str> {
        let lower = user_text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();
        let has_word = |wanted: &str| words.iter().any(|word| *word == wanted);
        if lower.contains("how are you") {
            Some("I'm doing well! Everything in me is humming along.")
        } else if has_word("test") {
            Some("Testing... testing... yes, I'm working! My core responses are active.")
        } else if has_word("problem") || has_word("issue") {
            Some("I understand you're facing some challenges. I'm here to help however I can.")
        } else if has_word("hello") || has_word("hi") {
            Some("Hello! It's good to connect with you.")
        } else {
            None
        }
    }
}

#[async_trait]
impl TextModel for MockModel {
    fn describe(&self) -> String {
        "mock".to_string()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        if let Some(reply) = Self::keyed_reply(&request.user_text) {
            return Ok(reply.to_string());
        }
        GENERAL_REPLIES
            .choose(&mut rand::rng())
            .map(|reply| reply.to_string())
            .ok_or(ModelError::EmptyResponse)
    }
}
