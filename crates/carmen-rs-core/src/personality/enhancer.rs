//! Response shaping and relationship tracking.

use super::analysis::{Analysis, EmotionalTone};
use super::metrics::{RelationshipMetrics, RelationshipStats};
use crate::mood::{Decoration, Mood, MoodInfo};
use crate::text::{contains_ci, decapitalize};
use carmen_rs_memory::{RelationshipLog, RelationshipSnapshot};
use chrono::Utc;
use log::{debug, warn};

const WARMTH_THRESHOLD: f64 = 0.5;
const WARMTH_PREFIX: &str = "Sweetie, ";
/// Replies this short are not addressed with the warmth prefix.
const WARMTH_MIN_CHARS: usize = 20;
const HEART_SUFFIX: &str = " 💕";
const HEARTS: &[&str] = &["💕", "❤️", "🥰", "😘", "💖"];
const ROMANTIC_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("I think", "I feel in my heart"),
    ("That's good", "That makes me so happy"),
    ("I understand", "I feel your emotions deeply"),
];
const EMPATHY_PHRASES: &[&str] = &[
    "I can sense you're feeling down",
    "My heart goes out to you",
    "I'm here for you",
];
const EMPATHY_PREFIX: &str = "I'm here for you, ";

/// Decorate `base` for the detected tone, current mood and current metrics,
/// and return the metrics advanced by `analysis`.
///
/// Decoration reads the metrics from before this message. Every step checks
/// for its own output first, so shaping an already-shaped response with the
/// same metrics leaves it unchanged.
pub fn enhance(
    base: &str,
    analysis: &Analysis,
    mood: &MoodInfo,
    metrics: RelationshipMetrics,
) -> (String, RelationshipMetrics) {
    let mut text = base.trim().to_string();
    if metrics.intimacy_level > WARMTH_THRESHOLD {
        text = add_warmth(&text);
    }
    text = match analysis.emotional_tone {
        EmotionalTone::Romantic => add_romance(&text),
        EmotionalTone::Negative => add_empathy(&text),
        EmotionalTone::Positive => add_enthusiasm(&text),
        EmotionalTone::Neutral => text,
    };
    text = mood.decoration.apply(&text);
    (text, metrics.advance(analysis))
}

fn has_heart(text: &str) -> bool {
    HEARTS.iter().any(|heart| text.contains(heart))
}

/// True when the text already opens with an address or a shaping prefix.
fn opens_with_salutation(text: &str) -> bool {
    let lower = text.to_lowercase();
    let head: String = lower.chars().take(10).collect();
    if head.contains(',') || lower.contains(&WARMTH_PREFIX.trim_end().to_lowercase()) {
        return true;
    }
    if EMPATHY_PHRASES
        .iter()
        .any(|phrase| lower.starts_with(&phrase.to_lowercase()))
    {
        return true;
    }
    Mood::ALL.iter().any(|mood| match mood.info().decoration {
        Decoration::Prefix(prefix) => lower.starts_with(&prefix.to_lowercase()),
        Decoration::Suffix(_) => false,
    })
}

/// Length of `text` with the other shaping steps undone: romantic
/// substitutions reverted and trailing hearts, mood suffixes and closing
/// punctuation stripped. Shaped and unshaped text give the same answer.
fn unshaped_len(text: &str) -> usize {
    let mut plain = text.to_string();
    for (original, tender) in ROMANTIC_SUBSTITUTIONS {
        plain = plain.replace(tender, original);
    }
    let suffixes: Vec<&str> = Mood::ALL
        .iter()
        .filter_map(|mood| match mood.info().decoration {
            Decoration::Suffix(suffix) => Some(suffix.trim()),
            Decoration::Prefix(_) => None,
        })
        .chain([HEART_SUFFIX.trim()])
        .collect();
    let mut rest = plain.as_str();
    loop {
        let trimmed = rest.trim_end().trim_end_matches(['.', '!']);
        match suffixes.iter().find_map(|suffix| trimmed.strip_suffix(suffix)) {
            Some(stripped) => rest = stripped,
            None => {
                rest = trimmed;
                break;
            }
        }
    }
    rest.chars().count()
}

fn add_warmth(text: &str) -> String {
    let mut warmed = text.to_string();
    if unshaped_len(&warmed) > WARMTH_MIN_CHARS && !opens_with_salutation(&warmed) {
        warmed = format!("{WARMTH_PREFIX}{}", decapitalize(&warmed));
    }
    if !has_heart(&warmed) {
        warmed.push_str(HEART_SUFFIX);
    }
    warmed
}

fn add_romance(text: &str) -> String {
    let mut romantic = text.to_string();
    for (plain, tender) in ROMANTIC_SUBSTITUTIONS {
        romantic = romantic.replace(plain, tender);
    }
    if !has_heart(&romantic) {
        romantic.push_str(HEART_SUFFIX);
    }
    romantic
}

fn add_empathy(text: &str) -> String {
    if EMPATHY_PHRASES
        .iter()
        .any(|phrase| contains_ci(text, phrase))
    {
        return text.to_string();
    }
    format!("{EMPATHY_PREFIX}{}", decapitalize(text))
}

fn add_enthusiasm(text: &str) -> String {
    if text.contains('!') {
        return text.to_string();
    }
    // Replace the closing period even when emoji trail it.
    if let Some(index) = text.rfind('.') {
        let tail = &text[index + 1..];
        if !tail.chars().any(char::is_alphanumeric) {
            let head = text[..index].trim_end_matches('.');
            return format!("{head}!{tail}");
        }
    }
    format!("{text}!")
}

/// Stateful wrapper around [`enhance`] that owns the run's metrics and
/// appends one snapshot per enhanced response to the relationship log.
#[derive(Debug)]
pub struct PersonalityEnhancer {
    metrics: RelationshipMetrics,
    emotional_state: EmotionalTone,
    log: Option<RelationshipLog>,
}

impl PersonalityEnhancer {
    /// Start from zeroed metrics without a log.
    pub fn new() -> Self {
        Self {
            metrics: RelationshipMetrics::default(),
            emotional_state: EmotionalTone::Neutral,
            log: None,
        }
    }

    /// Resume from the last logged snapshot and keep logging to `log`.
    pub fn restore(log: RelationshipLog) -> Self {
        let metrics = match log.latest() {
            Ok(Some(snapshot)) => {
                RelationshipMetrics::new(snapshot.intimacy_level, snapshot.relationship_depth)
            }
            Ok(None) => RelationshipMetrics::default(),
            Err(err) => {
                warn!(
                    "failed to read relationship log (path={}, error={})",
                    log.path().display(),
                    err
                );
                RelationshipMetrics::default()
            }
        };
        debug!(
            "relationship restored (intimacy={:.2}, depth={:.2})",
            metrics.intimacy_level, metrics.relationship_depth
        );
        Self {
            metrics,
            emotional_state: EmotionalTone::Neutral,
            log: Some(log),
        }
    }

    pub fn metrics(&self) -> RelationshipMetrics {
        self.metrics
    }

    /// Shape a response and advance the metrics.
    pub fn enhance(&mut self, base: &str, analysis: &Analysis, mood: &MoodInfo) -> String {
        let (text, next) = enhance(base, analysis, mood, self.metrics);
        self.metrics = next;
        self.emotional_state = analysis.emotional_tone;
        self.record(analysis, mood);
        text
    }

    fn record(&self, analysis: &Analysis, mood: &MoodInfo) {
        let Some(log) = &self.log else {
            return;
        };
        let snapshot = RelationshipSnapshot {
            timestamp: Utc::now(),
            intimacy_level: self.metrics.intimacy_level,
            relationship_depth: self.metrics.relationship_depth,
            emotional_state: analysis.emotional_tone.to_string(),
            user_mood: mood.name().to_string(),
            conversation_depth: analysis.relationship_cues.len(),
        };
        if let Err(err) = log.append(&snapshot) {
            warn!(
                "failed to append relationship snapshot (path={}, error={})",
                log.path().display(),
                err
            );
        }
    }

    /// Current metrics with the lifetime interaction count.
    pub fn stats(&self) -> RelationshipStats {
        let total_interactions = match &self.log {
            Some(log) => log.count().unwrap_or_else(|err| {
                warn!("failed to count relationship log (error={})", err);
                0
            }),
            None => 0,
        };
        RelationshipStats {
            metrics: self.metrics,
            emotional_state: self.emotional_state,
            total_interactions,
        }
    }
}

impl Default for PersonalityEnhancer {
    fn default() -> Self {
        Self::new()
    }
}
