//! Prompt assembly and the greeting shown when a session starts.

use crate::text::tail_chars;
use carmen_rs_memory::{ChatTurn, TurnRole};

/// User and assistant turns carried into the prompt.
pub const HISTORY_TURNS: usize = 6;
/// Prompt length cap in characters. History goes first, then the oldest
/// part of the new message; the persona and mood line always stay.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Build the completion prompt: persona and mood, recent exchange, then the
/// new message with an open line for the companion.
pub fn build_prompt(
    style: &str,
    mood: &str,
    name: &str,
    username: &str,
    history: &[ChatTurn],
    user_text: &str,
) -> String {
    let header = format!("{}\nCurrent mood: {mood}.\n\n", style.trim());
    let frame = format!("{username}: \n{name}:");
    let budget = MAX_PROMPT_CHARS
        .saturating_sub(header.chars().count())
        .saturating_sub(frame.chars().count());
    let user_text = tail_chars(user_text, budget);
    let mut remaining = budget - user_text.chars().count();

    let mut lines: Vec<String> = Vec::new();
    for turn in history
        .iter()
        .rev()
        .filter(|turn| turn.role != TurnRole::System)
        .take(HISTORY_TURNS)
    {
        let speaker = match turn.role {
            TurnRole::User => username,
            _ => name,
        };
        let line = format!("{speaker}: {}\n", turn.text);
        let len = line.chars().count();
        if len > remaining {
            break;
        }
        remaining -= len;
        lines.push(line);
    }

    let mut prompt = header;
    for line in lines.iter().rev() {
        prompt.push_str(line);
    }
    prompt.push_str(&format!("{username}: {user_text}\n{name}:"));
    prompt
}

/// Time-of-day greeting, with a reminder of the last session when one exists.
pub fn welcome_message(hour: u32, recent: &[String]) -> String {
    let opening = match hour {
        0..=11 => "You're up early...",
        12..=17 => "There you are.",
        _ => "Evening already?",
    };
    let mut message = format!("{opening} I've missed your mind.");
    if !recent.is_empty() {
        message.push_str(&format!(" (Last time, you mentioned: {})", recent.join(", ")));
    }
    message
}
