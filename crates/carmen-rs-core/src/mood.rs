//! Mood registry: the closed set of moods with their presentation metadata
//! and the decoration each one applies to responses.

use crate::text::decapitalize;
use std::fmt;
use thiserror::Error;

/// Companion mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Supportive,
    Flirty,
    Intellectual,
    Chaotic,
    Dreamlike,
}

impl Mood {
    /// All moods in registration order.
    pub const ALL: [Mood; 5] = [
        Mood::Supportive,
        Mood::Flirty,
        Mood::Intellectual,
        Mood::Chaotic,
        Mood::Dreamlike,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Supportive => "Supportive",
            Mood::Flirty => "Flirty",
            Mood::Intellectual => "Intellectual",
            Mood::Chaotic => "Chaotic",
            Mood::Dreamlike => "Dreamlike",
        }
    }

    /// Static metadata for this mood.
    pub fn info(self) -> &'static MoodInfo {
        match self {
            Mood::Supportive => &MOODS[0],
            Mood::Flirty => &MOODS[1],
            Mood::Intellectual => &MOODS[2],
            Mood::Chaotic => &MOODS[3],
            Mood::Dreamlike => &MOODS[4],
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text a mood adds to every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    /// Prepended; the response's first letter is lowercased to follow it.
    Prefix(&'static str),
    /// Appended.
    Suffix(&'static str),
}

impl Decoration {
    /// Apply the decoration unless it is already present.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Decoration::Prefix(prefix) => {
                if text.starts_with(prefix) {
                    text.to_string()
                } else {
                    format!("{prefix}{}", decapitalize(text))
                }
            }
            Decoration::Suffix(suffix) => {
                if text.ends_with(suffix) {
                    text.to_string()
                } else {
                    format!("{text}{suffix}")
                }
            }
        }
    }
}

/// Presentation metadata and response shaping for one mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodInfo {
    pub mood: Mood,
    pub emoji: &'static str,
    /// Avatar clip file name under the avatars directory.
    pub avatar: &'static str,
    /// Ambient loop file name under the sounds directory.
    pub ambient_sound: &'static str,
    /// Speaking rate override in words per minute.
    pub speech_rate: Option<u32>,
    pub decoration: Decoration,
}

impl MoodInfo {
    pub fn name(&self) -> &'static str {
        self.mood.as_str()
    }
}

static MOODS: [MoodInfo; 5] = [
    MoodInfo {
        mood: Mood::Supportive,
        emoji: "💖",
        avatar: "supportive.mp4",
        ambient_sound: "ambient_supportive.mp3",
        speech_rate: None,
        decoration: Decoration::Suffix(" I'm always here for you 💖"),
    },
    MoodInfo {
        mood: Mood::Flirty,
        emoji: "😘",
        avatar: "flirty.mp4",
        ambient_sound: "ambient_flirty.mp3",
        speech_rate: Some(190),
        decoration: Decoration::Suffix(" 😘"),
    },
    MoodInfo {
        mood: Mood::Intellectual,
        emoji: "🧠",
        avatar: "intellectual.mp4",
        ambient_sound: "ambient_intellectual.mp3",
        speech_rate: Some(170),
        decoration: Decoration::Prefix("Thoughtfully, "),
    },
    MoodInfo {
        mood: Mood::Chaotic,
        emoji: "🌀",
        avatar: "chaotic.mp4",
        ambient_sound: "ambient_chaotic.mp3",
        speech_rate: Some(210),
        decoration: Decoration::Suffix(" 🌟✨"),
    },
    MoodInfo {
        mood: Mood::Dreamlike,
        emoji: "🌙",
        avatar: "supportive.mp4",
        ambient_sound: "dreamscape_loop.mp3",
        speech_rate: Some(150),
        decoration: Decoration::Suffix(" 🌙"),
    },
];

/// Errors returned by mood lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoodError {
    /// No mood with this name; `available` lists valid names in order.
    #[error("Unknown mood '{name}'. Available: {}", .available.join(", "))]
    NotFound {
        name: String,
        available: Vec<String>,
    },
}

/// Lookup over the static mood table.
#[derive(Debug, Clone, Copy)]
pub struct MoodRegistry {
    entries: &'static [MoodInfo],
}

impl Default for MoodRegistry {
    fn default() -> Self {
        Self { entries: &MOODS }
    }
}

impl MoodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive lookup by name.
    pub fn get(&self, name: &str) -> Result<&'static MoodInfo, MoodError> {
        let wanted = name.trim();
        self.entries
            .iter()
            .find(|info| info.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MoodError::NotFound {
                name: wanted.to_string(),
                available: self.all_names().iter().map(|name| name.to_string()).collect(),
            })
    }

    /// Mood names in registration order.
    pub fn all_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(MoodInfo::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static MoodInfo> {
        self.entries.iter()
    }

    /// Mood after `name` in registration order, wrapping around.
    pub fn next_after(&self, name: &str) -> &'static MoodInfo {
        let position = self
            .entries
            .iter()
            .position(|info| info.name().eq_ignore_ascii_case(name.trim()));
        match position {
            Some(index) => &self.entries[(index + 1) % self.entries.len()],
            None => Mood::Supportive.info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Decoration, Mood, MoodError, MoodRegistry};
    use pretty_assertions::assert_eq;

    #[test]
    fn supportive_matches_table() {
        let info = MoodRegistry::new().get("Supportive").expect("supportive");
        assert_eq!(info.mood, Mood::Supportive);
        assert_eq!(info.emoji, "💖");
        assert_eq!(info.avatar, "supportive.mp4");
        assert_eq!(info.ambient_sound, "ambient_supportive.mp3");
        assert_eq!(info.speech_rate, None);
        assert_eq!(
            info.decoration,
            Decoration::Suffix(" I'm always here for you 💖")
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let info = MoodRegistry::new().get("  dreamLIKE ").expect("dreamlike");
        assert_eq!(info.mood, Mood::Dreamlike);
        assert_eq!(info.ambient_sound, "dreamscape_loop.mp3");
    }

    #[test]
    fn unknown_mood_lists_available_names() {
        let err = MoodRegistry::new().get("Unknown").expect_err("unknown");
        assert_eq!(
            err,
            MoodError::NotFound {
                name: "Unknown".to_string(),
                available: vec![
                    "Supportive".to_string(),
                    "Flirty".to_string(),
                    "Intellectual".to_string(),
                    "Chaotic".to_string(),
                    "Dreamlike".to_string(),
                ],
            }
        );
        assert_eq!(
            err.to_string(),
            "Unknown mood 'Unknown'. Available: Supportive, Flirty, Intellectual, Chaotic, Dreamlike"
        );
    }

    #[test]
    fn names_follow_registration_order() {
        let registry = MoodRegistry::new();
        assert_eq!(
            registry.all_names(),
            vec!["Supportive", "Flirty", "Intellectual", "Chaotic", "Dreamlike"]
        );
        for mood in Mood::ALL {
            assert_eq!(mood.info().mood, mood);
        }
        assert_eq!(registry.next_after("Dreamlike").mood, Mood::Supportive);
        assert_eq!(registry.next_after("flirty").mood, Mood::Intellectual);
    }

    #[test]
    fn decorations_do_not_compound() {
        let prefix = Decoration::Prefix("Thoughtfully, ");
        let once = prefix.apply("That is a deep question.");
        assert_eq!(once, "Thoughtfully, that is a deep question.");
        assert_eq!(prefix.apply(&once), once);

        let suffix = Decoration::Suffix(" 🌟✨");
        let once = suffix.apply("Wild!");
        assert_eq!(suffix.apply(&once), "Wild! 🌟✨");
    }
}
