//! Speech playback: an engine seam plus a single-slot player.

use carmen_rs_config::SpeechConfig;
use log::debug;
use parking_lot::Mutex;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::process::{Child, Command};

const MAX_SPOKEN_CHARS: usize = 500;

/// Errors returned by speech engines.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Spawning the synthesizer failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Nothing speakable after cleaning.
    #[error("nothing to speak")]
    Empty,
}

/// Text and voice parameters for one playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub voice: String,
    /// Words per minute.
    pub rate: u32,
}

/// Handle to a playback in progress.
pub trait Playback: Send {
    /// Stop playback; must be safe to call after it already finished.
    fn stop(&mut self);
}

/// Something that can start speaking an utterance.
pub trait SpeechEngine: Send + Sync {
    fn start(&self, utterance: &Utterance) -> Result<Box<dyn Playback>, SpeechError>;
}

/// Runs an external synthesizer such as `espeak -s <rate> -v <voice> <text>`.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    command: String,
}

impl CommandSpeech {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

struct ChildPlayback {
    child: Child,
}

impl Playback for ChildPlayback {
    fn stop(&mut self) {
        if let Err(err) = self.child.start_kill() {
            debug!("speech process already stopped (error={})", err);
        }
    }
}

impl SpeechEngine for CommandSpeech {
    fn start(&self, utterance: &Utterance) -> Result<Box<dyn Playback>, SpeechError> {
        let child = Command::new(&self.command)
            .arg("-s")
            .arg(utterance.rate.to_string())
            .arg("-v")
            .arg(&utterance.voice)
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        Ok(Box::new(ChildPlayback { child }))
    }
}

/// Engine that never makes a sound.
#[derive(Debug, Clone, Default)]
pub struct NoopSpeech;

struct NoopPlayback;

impl Playback for NoopPlayback {
    fn stop(&mut self) {}
}

impl SpeechEngine for NoopSpeech {
    fn start(&self, _utterance: &Utterance) -> Result<Box<dyn Playback>, SpeechError> {
        Ok(Box::new(NoopPlayback))
    }
}

/// Holds the single playback slot: starting a new utterance stops the
/// current one first. Failures are logged and swallowed.
pub struct SpeechPlayer {
    engine: Arc<dyn SpeechEngine>,
    current: Mutex<Option<Box<dyn Playback>>>,
    enabled: AtomicBool,
}

impl SpeechPlayer {
    pub fn new(engine: Arc<dyn SpeechEngine>, enabled: bool) -> Self {
        Self {
            engine,
            current: Mutex::new(None),
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Player for the configured synthesizer.
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(Arc::new(CommandSpeech::new(config.command.clone())), config.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Enable or disable playback; disabling stops the current utterance.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.stop();
        }
    }

    /// Speak `text`, replacing whatever is playing.
    pub fn play(&self, text: &str, voice: &str, rate: u32) {
        if !self.is_enabled() {
            return;
        }
        let text = clean_for_speech(text);
        if text.is_empty() {
            debug!("speech skipped (reason={})", SpeechError::Empty);
            return;
        }
        let utterance = Utterance {
            text,
            voice: voice.to_string(),
            rate,
        };
        let mut current = self.current.lock();
        if let Some(mut playback) = current.take() {
            playback.stop();
        }
        match self.engine.start(&utterance) {
            Ok(playback) => *current = Some(playback),
            Err(err) => debug!("speech failed (error={})", err),
        }
    }

    /// Stop the current utterance, if any.
    pub fn stop(&self) {
        if let Some(mut playback) = self.current.lock().take() {
            playback.stop();
        }
    }
}

impl std::fmt::Debug for SpeechPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechPlayer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Strip speaker labels and bracketing punctuation and cap the length.
pub fn clean_for_speech(text: &str) -> String {
    let mut cleaned = text.trim();
    if let Some((label, rest)) = cleaned.split_once(':')
        && !label.is_empty()
        && label.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
    {
        cleaned = rest.trim_start();
    }
    let cleaned: String = cleaned
        .chars()
        .filter(|ch| !matches!(ch, '"' | '[' | ']' | '(' | ')'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.chars().count() > MAX_SPOKEN_CHARS {
        let cut: String = cleaned.chars().take(MAX_SPOKEN_CHARS).collect();
        format!("{cut}...")
    } else {
        cleaned.to_string()
    }
}
