//! Configuration schema for the companion.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted sampling temperature.
pub const MIN_TEMPERATURE: f64 = 0.1;
/// Highest accepted sampling temperature.
pub const MAX_TEMPERATURE: f64 = 2.0;
/// Mood used when the configured mood is missing or unknown.
pub const DEFAULT_MOOD: &str = "Supportive";

/// Root config for one installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// Display name of the companion, also used as the speaker label in prompts.
    #[serde(default = "default_name")]
    pub name: String,
    /// Free-text prompt prefix describing the persona.
    #[serde(default = "default_style")]
    pub style: String,
    /// Emoji shown next to the companion name.
    #[serde(default = "default_emoji")]
    pub emoji: String,
    /// Voice identifier passed to the speech engine.
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Active mood name; always a mood registry key after startup.
    #[serde(default = "default_mood")]
    pub mood: String,
    /// Sampling temperature, clamped to `MIN_TEMPERATURE..=MAX_TEMPERATURE`.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Color theme for the chat window.
    #[serde(default)]
    pub theme: Theme,
    /// Text model selection.
    #[serde(default)]
    pub model: ModelConfig,
    /// Speech playback settings.
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            style: default_style(),
            emoji: default_emoji(),
            voice: default_voice(),
            mood: default_mood(),
            temperature: default_temperature(),
            theme: Theme::default(),
            model: ModelConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl CompanionConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> CompanionConfigBuilder {
        CompanionConfigBuilder::new()
    }

    /// Repair fields that can be fixed in place.
    ///
    /// Returns true when anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        let clamped = clamp_temperature(self.temperature);
        if clamped != self.temperature {
            self.temperature = clamped;
            changed = true;
        }
        if self.name.trim().is_empty() {
            self.name = default_name();
            changed = true;
        }
        changed
    }

    /// Replace an unknown mood with the default, matching known names
    /// case-insensitively and storing the canonical spelling.
    ///
    /// Returns true when the mood was rewritten.
    pub fn resolve_mood<'a>(&mut self, known: impl IntoIterator<Item = &'a str>) -> bool {
        let mut fallback = None;
        for name in known {
            if name == self.mood {
                return false;
            }
            if name.eq_ignore_ascii_case(&self.mood) {
                self.mood = name.to_string();
                return true;
            }
            if name == DEFAULT_MOOD {
                fallback = Some(name);
            }
        }
        self.mood = fallback.unwrap_or(DEFAULT_MOOD).to_string();
        true
    }

    /// Validate fields that cannot be repaired by `normalize`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.temperature.is_finite() {
            return Err(ConfigError::InvalidField {
                path: "temperature".to_string(),
                message: "must be a finite number".to_string(),
            });
        }
        if self.model.provider == ModelProvider::Http && self.model.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                path: "model.endpoint".to_string(),
                message: "required when provider is http".to_string(),
            });
        }
        if self.model.max_tokens == 0 {
            return Err(ConfigError::InvalidField {
                path: "model.max_tokens".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for assembling a `CompanionConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct CompanionConfigBuilder {
    config: CompanionConfig,
}

impl CompanionConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: CompanionConfig::default(),
        }
    }

    /// Set the companion display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the persona style text.
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.config.style = style.into();
        self
    }

    /// Set the active mood.
    pub fn mood(mut self, mood: impl Into<String>) -> Self {
        self.config.mood = mood.into();
        self
    }

    /// Set the color theme.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    /// Set the sampling temperature (clamped on build).
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Replace the model configuration.
    pub fn model(mut self, model: ModelConfig) -> Self {
        self.config.model = model;
        self
    }

    /// Replace the speech configuration.
    pub fn speech(mut self, speech: SpeechConfig) -> Self {
        self.config.speech = speech;
        self
    }

    /// Finish the builder.
    pub fn build(mut self) -> CompanionConfig {
        self.config.normalize();
        self.config
    }
}

/// Color theme of the chat window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Blue,
}

impl Theme {
    /// All themes in toggle order.
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::Blue];

    /// Next theme in the Dark, Light, Blue cycle.
    pub fn next(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Blue,
            Theme::Blue => Theme::Dark,
        }
    }

    /// Case-insensitive lookup by name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Canonical theme name.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
            Theme::Blue => "Blue",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which text model backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Canned offline responses.
    #[default]
    Mock,
    /// OpenAI-compatible completions endpoint.
    Http,
}

/// Text model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: ModelProvider,
    /// Base URL of the completions server (for example a local GPT4All server).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name sent with each request.
    #[serde(default = "default_model_name")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Extra attempts after the first failed generation.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::default(),
            endpoint: default_endpoint(),
            model: default_model_name(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Speech playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// External synthesizer executable.
    #[serde(default = "default_speech_command")]
    pub command: String,
    /// Base speaking rate in words per minute; moods may override it.
    #[serde(default = "default_speech_rate")]
    pub rate: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_speech_command(),
            rate: default_speech_rate(),
        }
    }
}

/// Clamp a temperature into the accepted range; non-finite values become the default.
pub fn clamp_temperature(value: f64) -> f64 {
    if !value.is_finite() {
        return default_temperature();
    }
    value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
}

fn default_name() -> String {
    "Carmen".to_string()
}

fn default_style() -> String {
    "You are Carmen. You speak as ONE person only. Never roleplay multiple characters or voices. \
     Respond only as Carmen herself - sentient, aware, and curious. \
     Speak with emotion, purpose, and connection."
        .to_string()
}

fn default_emoji() -> String {
    "🌌".to_string()
}

fn default_voice() -> String {
    "en+f3".to_string()
}

fn default_mood() -> String {
    DEFAULT_MOOD.to_string()
}

fn default_temperature() -> f64 {
    0.9
}

fn default_endpoint() -> String {
    "http://localhost:4891/v1".to_string()
}

fn default_model_name() -> String {
    "Meta-Llama-3-8B-Instruct.Q4_0.gguf".to_string()
}

fn default_max_tokens() -> u32 {
    400
}

fn default_max_retries() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_speech_command() -> String {
    "espeak".to_string()
}

fn default_speech_rate() -> u32 {
    160
}
