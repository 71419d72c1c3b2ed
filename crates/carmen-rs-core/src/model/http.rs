//! OpenAI-compatible completions client.

use super::{GenerationRequest, ModelError, TextModel};
use async_trait::async_trait;
use carmen_rs_config::ModelConfig;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

/// Environment variable holding an optional bearer token.
pub const API_KEY_ENV: &str = "CARMEN_API_KEY";

/// Model served over HTTP at `{endpoint}/completions`, such as a local
/// GPT4All or llama.cpp server.
#[derive(Debug, Clone)]
pub struct HttpModel {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpModel {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
        })
    }

    /// Build from config, reading the bearer token from `CARMEN_API_KEY`.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let mut model = Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        model.api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty());
        Ok(model)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextModel for HttpModel {
    fn describe(&self) -> String {
        format!("http:{}", self.model)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        let body = json!({
            "model": self.model,
            "prompt": request.prompt,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });
        debug!(
            "completion request (model={}, prompt_len={})",
            self.model,
            request.prompt.len()
        );
        let mut builder = self.client.post(self.completions_url()).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let value: Value = response.json().await?;
        parse_completion(&value)
    }
}

/// Extract `choices[0].text`, accepting chat-shaped bodies as well.
fn parse_completion(value: &Value) -> Result<String, ModelError> {
    let choice = &value["choices"][0];
    let text = choice["text"]
        .as_str()
        .or_else(|| choice["message"]["content"].as_str())
        .ok_or_else(|| ModelError::MalformedResponse("missing choices[0].text".to_string()))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    Ok(text.to_string())
}
