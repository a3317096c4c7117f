//! Model invocation boundary.
//!
//! The [`ModelClient`] trait decouples session orchestration from the actual
//! language-model backend (an OpenRouter-compatible chat-completions API).
//! Tests use scripted clients that return predetermined replies without
//! touching the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::core::transcript::ChatMessage;
use crate::error::ModelError;
use crate::io::config::ModelConfig;

/// Abstraction over chat-completion backends.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the ordered transcript and return the reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelError>;
}

/// Client for OpenRouter's chat-completions endpoint.
pub struct OpenRouterClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    referer: String,
    app_title: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterClient {
    /// Build a client, reading the API key from `config.api_key_env`.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ModelError::NotConfigured(format!("{} is not set", config.api_key_env))
            })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &ModelConfig, api_key: impl Into<String>) -> Result<Self, ModelError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::NotConfigured(format!("build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
            referer: config.referer.clone(),
            app_title: config.app_title.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.app_title)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("read body: {e}")))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "model API returned an error status");
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content = parse_completion(&body)?;
        debug!(reply_bytes = content.len(), "model reply received");
        Ok(content)
    }
}

/// Extract `choices[0].message.content` from a chat-completions body.
///
/// A choice without content yields an empty reply.
fn parse_completion(body: &str) -> Result<String, ModelError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(ModelError::EmptyResponse)?;
    Ok(choice
        .message
        .and_then(|message| message.content)
        .unwrap_or_default())
}
