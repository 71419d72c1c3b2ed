//! Keyword analysis of user messages.

use serde::Serialize;
use std::fmt;

const POSITIVE_WORDS: &[&str] = &[
    "happy",
    "love",
    "joy",
    "excited",
    "wonderful",
    "amazing",
    "great",
];
const NEGATIVE_WORDS: &[&str] = &[
    "sad",
    "angry",
    "frustrated",
    "upset",
    "disappointed",
    "hurt",
];
// "love" is listed here as well so that affectionate statements read as romantic.
const ROMANTIC_WORDS: &[&str] = &[
    "miss",
    "care",
    "feelings",
    "heart",
    "sweet",
    "beautiful",
    "special",
    "love",
];

const INTIMACY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "personal_sharing",
        &["feel", "think", "believe", "remember", "hope"],
    ),
    (
        "vulnerability",
        &["scared", "worried", "nervous", "uncertain", "confused"],
    ),
    (
        "affection",
        &["care about", "mean to me", "special", "important", "love"],
    ),
    ("trust", &["trust", "confide", "secret", "private", "personal"]),
];

const RELATIONSHIP_PATTERNS: &[(&str, &[&str])] = &[
    (
        "deepening",
        &["get to know", "learn about", "understand", "closer"],
    ),
    ("appreciation", &["thank", "grateful", "appreciate", "helpful"]),
    ("bonding", &["together", "we", "us", "share", "connection"]),
    ("commitment", &["always", "forever", "never leave", "stay with"]),
];

/// Emotional tone detected in a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTone {
    Romantic,
    Positive,
    Negative,
    Neutral,
}

impl EmotionalTone {
    pub fn as_str(self) -> &'static str {
        match self {
            EmotionalTone::Romantic => "romantic",
            EmotionalTone::Positive => "positive",
            EmotionalTone::Negative => "negative",
            EmotionalTone::Neutral => "neutral",
        }
    }
}

impl fmt::Display for EmotionalTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analyzing one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub emotional_tone: EmotionalTone,
    /// Matched intimacy categories, in table order.
    pub intimacy_indicators: Vec<&'static str>,
    /// Matched relationship categories, in table order.
    pub relationship_cues: Vec<&'static str>,
}

/// Classify a user message by substring matches on its lowercased text.
pub fn analyze(text: &str) -> Analysis {
    let lower = text.to_lowercase();
    Analysis {
        emotional_tone: detect_tone(&lower),
        intimacy_indicators: matched_categories(&lower, INTIMACY_PATTERNS),
        relationship_cues: matched_categories(&lower, RELATIONSHIP_PATTERNS),
    }
}

fn detect_tone(lower: &str) -> EmotionalTone {
    let count = |words: &[&str]| words.iter().filter(|word| lower.contains(*word)).count();
    let romantic = count(ROMANTIC_WORDS);
    let positive = count(POSITIVE_WORDS);
    let negative = count(NEGATIVE_WORDS);
    if romantic > 0 {
        EmotionalTone::Romantic
    } else if positive > negative {
        EmotionalTone::Positive
    } else if negative > positive {
        EmotionalTone::Negative
    } else {
        EmotionalTone::Neutral
    }
}

fn matched_categories(lower: &str, table: &[(&'static str, &[&str])]) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(_, patterns)| patterns.iter().any(|pattern| lower.contains(pattern)))
        .map(|(category, _)| *category)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{EmotionalTone, analyze};
    use pretty_assertions::assert_eq;

    #[test]
    fn love_reads_as_romantic() {
        let analysis = analyze("I love spending time with you");
        assert_eq!(analysis.emotional_tone, EmotionalTone::Romantic);
        assert_eq!(analysis.intimacy_indicators, vec!["affection"]);
    }

    #[test]
    fn upset_reads_as_negative() {
        let analysis = analyze("I'm really upset today");
        assert_eq!(analysis.emotional_tone, EmotionalTone::Negative);
        assert!(analysis.relationship_cues.is_empty());
    }

    #[test]
    fn positive_beats_negative_by_count() {
        assert_eq!(
            analyze("Great news, I'm so happy even if a bit sad").emotional_tone,
            EmotionalTone::Positive
        );
        assert_eq!(analyze("The sky is grey").emotional_tone, EmotionalTone::Neutral);
        assert_eq!(
            analyze("happy and sad").emotional_tone,
            EmotionalTone::Neutral
        );
    }

    #[test]
    fn categories_are_counted_once() {
        let analysis =
            analyze("Thank you, I trust you with this secret and I hope we stay together forever");
        assert_eq!(
            analysis.intimacy_indicators,
            vec!["personal_sharing", "trust"]
        );
        assert_eq!(
            analysis.relationship_cues,
            vec!["appreciation", "bonding", "commitment"]
        );
    }
}
