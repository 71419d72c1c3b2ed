//! Core of the Carmen companion: moods, the personality layer, text model
//! and speech seams, and the chat controller that ties them together.

pub mod assets;
pub mod context;
pub mod controller;
pub mod error;
pub mod model;
pub mod mood;
pub mod personality;
pub mod prompt;
pub mod speech;
mod text;

pub use assets::{AssetDirectory, AudioSource, FrameSource, NullAssets};
pub use context::{AppContext, AppContextBuilder};
pub use controller::{
    ChatController, Command, CommandEffect, ControllerState, FALLBACK_REPLY, FAREWELL,
    SHUTDOWN_GRACE, Submission, TurnOutcome,
};
pub use error::CoreError;
pub use model::{
    CancelToken, GenerationRequest, HttpModel, MockModel, ModelError, TextModel,
    generate_with_retry, model_from_config,
};
pub use mood::{Decoration, Mood, MoodError, MoodInfo, MoodRegistry};
pub use personality::{
    Analysis, EmotionalTone, PersonalityEnhancer, RelationshipMetrics, RelationshipStats,
    analyze, enhance,
};
pub use speech::{
    CommandSpeech, NoopSpeech, Playback, SpeechEngine, SpeechError, SpeechPlayer, Utterance,
};
