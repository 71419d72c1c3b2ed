//! Application context: every collaborator the controller needs, built once
//! at startup and passed down.

use crate::assets::{AssetDirectory, AudioSource, FrameSource};
use crate::error::CoreError;
use crate::model::{TextModel, model_from_config};
use crate::mood::{Mood, MoodInfo, MoodRegistry};
use crate::personality::PersonalityEnhancer;
use crate::speech::{CommandSpeech, SpeechEngine, SpeechPlayer};
use carmen_rs_config::{CompanionConfig, ConfigStore, DataDirs};
use carmen_rs_memory::{
    ConversationLog, LogRetentionPolicy, MemoryRetentionPolicy, MemoryStore, RelationshipLog,
};
use log::{info, warn};
use std::sync::Arc;

/// Owned state for one running companion.
pub struct AppContext {
    pub dirs: DataDirs,
    pub config_store: ConfigStore,
    pub config: CompanionConfig,
    pub memory: MemoryStore,
    pub moods: MoodRegistry,
    pub enhancer: PersonalityEnhancer,
    pub conversation_log: ConversationLog,
    pub model: Arc<dyn TextModel>,
    pub speech: SpeechPlayer,
    pub frames: Arc<dyn FrameSource>,
    pub audio: Arc<dyn AudioSource>,
}

impl AppContext {
    pub fn builder(dirs: DataDirs) -> AppContextBuilder {
        AppContextBuilder::new(dirs)
    }

    /// Metadata for the configured mood.
    pub fn current_mood(&self) -> &'static MoodInfo {
        self.moods
            .get(&self.config.mood)
            .unwrap_or_else(|_| Mood::Supportive.info())
    }

    /// Persist the config, logging failures.
    pub fn save_config(&self) -> bool {
        self.config_store.save(&self.config)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("root", &self.dirs.root())
            .field("config", &self.config)
            .field("model", &self.model.describe())
            .finish()
    }
}

/// Builder for [`AppContext`]; anything not supplied is derived from the
/// data directory and the stored config.
pub struct AppContextBuilder {
    dirs: DataDirs,
    config: Option<CompanionConfig>,
    model: Option<Arc<dyn TextModel>>,
    speech_engine: Option<Arc<dyn SpeechEngine>>,
    speech_enabled: Option<bool>,
    frames: Option<Arc<dyn FrameSource>>,
    audio: Option<Arc<dyn AudioSource>>,
    memory_policy: MemoryRetentionPolicy,
    log_policy: LogRetentionPolicy,
}

impl AppContextBuilder {
    pub fn new(dirs: DataDirs) -> Self {
        Self {
            dirs,
            config: None,
            model: None,
            speech_engine: None,
            speech_enabled: None,
            frames: None,
            audio: None,
            memory_policy: MemoryRetentionPolicy::default(),
            log_policy: LogRetentionPolicy::default(),
        }
    }

    /// Use this config instead of the stored one.
    pub fn config(mut self, config: CompanionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this model instead of the one selected by the config.
    pub fn model(mut self, model: Arc<dyn TextModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn speech_engine(mut self, engine: Arc<dyn SpeechEngine>) -> Self {
        self.speech_engine = Some(engine);
        self
    }

    /// Override `speech.enabled` for this run without touching the file.
    pub fn speech_enabled(mut self, enabled: bool) -> Self {
        self.speech_enabled = Some(enabled);
        self
    }

    pub fn frames(mut self, frames: Arc<dyn FrameSource>) -> Self {
        self.frames = Some(frames);
        self
    }

    pub fn audio(mut self, audio: Arc<dyn AudioSource>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn memory_policy(mut self, policy: MemoryRetentionPolicy) -> Self {
        self.memory_policy = policy;
        self
    }

    pub fn log_policy(mut self, policy: LogRetentionPolicy) -> Self {
        self.log_policy = policy;
        self
    }

    pub fn build(self) -> Result<AppContext, CoreError> {
        let dirs = self.dirs;
        let config_store = ConfigStore::new(dirs.config_file());
        let moods = MoodRegistry::new();
        let mut config = self.config.unwrap_or_else(|| config_store.load());
        config.normalize();
        if config.resolve_mood(moods.all_names()) {
            warn!("configured mood unknown, using {} instead", config.mood);
            config_store.save(&config);
        }
        config.validate()?;

        let model = match self.model {
            Some(model) => model,
            None => model_from_config(&config.model)?,
        };
        let engine = self
            .speech_engine
            .unwrap_or_else(|| Arc::new(CommandSpeech::new(config.speech.command.clone())));
        let speech = SpeechPlayer::new(
            engine,
            self.speech_enabled.unwrap_or(config.speech.enabled),
        );

        let asset_directory = Arc::new(AssetDirectory::new(dirs.avatars_dir(), dirs.sounds_dir()));
        let frames = self
            .frames
            .unwrap_or_else(|| asset_directory.clone() as Arc<dyn FrameSource>);
        let audio = self
            .audio
            .unwrap_or_else(|| asset_directory as Arc<dyn AudioSource>);

        let memory = MemoryStore::load(dirs.memory_file(), self.memory_policy);
        let enhancer = PersonalityEnhancer::restore(RelationshipLog::new(dirs.relationship_log()));
        let conversation_log = ConversationLog::open(dirs.conversation_log(), self.log_policy);

        info!(
            "companion ready (root={}, name={}, mood={}, model={})",
            dirs.root().display(),
            config.name,
            config.mood,
            model.describe()
        );
        Ok(AppContext {
            dirs,
            config_store,
            config,
            memory,
            moods,
            enhancer,
            conversation_log,
            model,
            speech,
            frames,
            audio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AppContext;
    use crate::model::MockModel;
    use crate::speech::NoopSpeech;
    use carmen_rs_config::{CompanionConfig, ConfigStore, DataDirs};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn unknown_stored_mood_is_replaced_and_saved() {
        let temp = tempdir().expect("tempdir");
        let dirs = DataDirs::new(temp.path());
        let store = ConfigStore::new(dirs.config_file());
        let config = CompanionConfig::builder().mood("Grumpy").build();
        assert!(store.save(&config));

        let context = AppContext::builder(dirs)
            .model(Arc::new(MockModel::new()))
            .speech_engine(Arc::new(NoopSpeech))
            .build()
            .expect("context");
        assert_eq!(context.config.mood, "Supportive");
        assert_eq!(store.load().mood, "Supportive");
    }

    #[test]
    fn mood_names_are_canonicalized() {
        let temp = tempdir().expect("tempdir");
        let context = AppContext::builder(DataDirs::new(temp.path()))
            .config(CompanionConfig::builder().mood("flirty").build())
            .speech_engine(Arc::new(NoopSpeech))
            .speech_enabled(false)
            .build()
            .expect("context");
        assert_eq!(context.config.mood, "Flirty");
        assert_eq!(context.current_mood().emoji, "😘");
        assert_eq!(context.model.describe(), "mock");
        assert!(!context.speech.is_enabled());
    }
}
