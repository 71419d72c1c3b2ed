use carmen_rs_config::{CompanionConfig, DataDirs};
use carmen_rs_core::{
    AppContext, AppContextBuilder, ChatController, SpeechEngine, TextModel, TurnOutcome,
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// A data directory in a temp dir plus the pieces to build a context in it.
pub struct TestContext {
    pub temp: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn dirs(&self) -> DataDirs {
        DataDirs::new(self.temp.path())
    }

    /// Builder with the given model and a silent speech engine.
    pub fn builder(&self, model: Arc<dyn TextModel>) -> AppContextBuilder {
        AppContext::builder(self.dirs())
            .model(model)
            .speech_engine(Arc::new(carmen_rs_core::NoopSpeech))
    }

    /// Controller with default config, the given model and speech engine.
    pub fn controller(
        &self,
        model: Arc<dyn TextModel>,
        speech: Arc<dyn SpeechEngine>,
    ) -> (ChatController, mpsc::Receiver<TurnOutcome>) {
        let context = self
            .builder(model)
            .config(CompanionConfig::default())
            .speech_engine(speech)
            .build()
            .expect("context");
        ChatController::new(context)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
