//! Text model seam and its implementations.

mod http;
mod mock;
mod retry;

pub use http::HttpModel;
pub use mock::MockModel;
pub use retry::{CancelToken, generate_with_retry};

use async_trait::async_trait;
use carmen_rs_config::{ModelConfig, ModelProvider};
use log::info;
use std::sync::Arc;
use thiserror::Error;

/// One generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Full prompt including persona and recent history.
    pub prompt: String,
    /// The user message the prompt ends with.
    pub user_text: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Errors returned by text models.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status from the server.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The model produced no text.
    #[error("empty response")]
    EmptyResponse,
    /// Generation was cancelled.
    #[error("generation cancelled")]
    Cancelled,
    /// Backend unavailable or misconfigured.
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// A text generator.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Short label recorded with each logged exchange.
    fn describe(&self) -> String;

    /// Generate a completion for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError>;
}

/// Build the model selected by `config.provider`.
pub fn model_from_config(config: &ModelConfig) -> Result<Arc<dyn TextModel>, ModelError> {
    let model: Arc<dyn TextModel> = match config.provider {
        ModelProvider::Mock => Arc::new(MockModel::new()),
        ModelProvider::Http => Arc::new(HttpModel::from_config(config)?),
    };
    info!("text model selected (model={})", model.describe());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::model_from_config;
    use carmen_rs_config::{ModelConfig, ModelProvider};
    use pretty_assertions::assert_eq;

    #[test]
    fn provider_selects_backend() {
        let mock = model_from_config(&ModelConfig::default()).expect("mock");
        assert_eq!(mock.describe(), "mock");

        let config = ModelConfig {
            provider: ModelProvider::Http,
            model: "llama".to_string(),
            ..ModelConfig::default()
        };
        let http = model_from_config(&config).expect("http");
        assert_eq!(http.describe(), "http:llama");
    }
}
