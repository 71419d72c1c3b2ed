use async_trait::async_trait;
use carmen_rs_core::{GenerationRequest, ModelError, TextModel};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Always answers with the same text.
#[derive(Debug, Clone)]
pub struct FixedModel {
    response: String,
}

impl FixedModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl TextModel for FixedModel {
    fn describe(&self) -> String {
        "fixed".to_string()
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ModelError> {
        Ok(self.response.clone())
    }
}

/// Always fails with `ModelError::Unavailable`.
#[derive(Debug, Clone)]
pub struct FailingModel {
    message: String,
}

impl FailingModel {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl TextModel for FailingModel {
    fn describe(&self) -> String {
        "failing".to_string()
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ModelError> {
        Err(ModelError::Unavailable(self.message.clone()))
    }
}

/// Records every request and echoes the user text back.
#[derive(Debug, Clone, Default)]
pub struct RecordingModel {
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl RecordingModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TextModel for RecordingModel {
    fn describe(&self) -> String {
        "recording".to_string()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        self.requests.lock().push(request.clone());
        Ok(format!("You said: {}", request.user_text))
    }
}

/// Holds every call until [`GatedModel::release`] hands out a permit, then
/// echoes the user text. Useful for observing queued submissions.
#[derive(Debug, Clone)]
pub struct GatedModel {
    gate: Arc<Semaphore>,
    started: Arc<Mutex<Vec<String>>>,
}

impl GatedModel {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            started: Arc::default(),
        }
    }

    /// Let `count` pending or future calls finish.
    pub fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    /// User texts of the calls that have started, in order.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }
}

impl Default for GatedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextModel for GatedModel {
    fn describe(&self) -> String {
        "gated".to_string()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        self.started.lock().push(request.user_text.clone());
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|err| ModelError::Unavailable(err.to_string()))?;
        permit.forget();
        Ok(format!("Reply to {}", request.user_text))
    }
}
