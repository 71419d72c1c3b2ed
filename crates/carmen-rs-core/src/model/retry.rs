//! Cancellable generation with bounded retries.

use super::{GenerationRequest, ModelError, TextModel};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Shared flag that stops in-flight and future generation attempts.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolve once `cancel` has been called.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this only ends on cancel.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

/// Call the model up to `1 + max_retries` times, stopping early on cancel.
///
/// Cancellation is checked between attempts and also races the attempt in
/// flight, so a cancelled call returns promptly.
pub async fn generate_with_retry(
    model: &dyn TextModel,
    request: &GenerationRequest,
    max_retries: u32,
    cancel: &CancelToken,
) -> Result<String, ModelError> {
    let mut attempt = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(ModelError::Cancelled);
        }
        let result = tokio::select! {
            result = model.generate(request) => result,
            _ = cancel.cancelled() => return Err(ModelError::Cancelled),
        };
        let err = match result {
            Ok(text) if text.trim().is_empty() => ModelError::EmptyResponse,
            Ok(text) => {
                debug!(
                    "generation finished (model={}, attempt={}, len={})",
                    model.describe(),
                    attempt + 1,
                    text.len()
                );
                return Ok(text.trim().to_string());
            }
            Err(err) => err,
        };
        if attempt >= max_retries {
            return Err(err);
        }
        attempt += 1;
        warn!(
            "generation failed, retrying (model={}, attempt={}, error={})",
            model.describe(),
            attempt,
            err
        );
        tokio::select! {
            _ = tokio::time::sleep(RETRY_BACKOFF * attempt) => {}
            _ = cancel.cancelled() => return Err(ModelError::Cancelled),
        }
    }
}
