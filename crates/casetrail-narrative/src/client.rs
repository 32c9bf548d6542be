//! Model backend clients.
//!
//! A single capability — complete a two-role chat prompt into text — with
//! one variant per backend, selected at construction time from
//! [`ModelConfig`]. The [`NarrativeModel`] trait is the seam the generator
//! and tests program against.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::config::{ModelBackend, ModelConfig};
use crate::error::{GenerationError, Result};

/// A two-role chat completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

/// The model capability: turn a prompt into text.
pub trait NarrativeModel: Send + Sync {
    /// Identity recorded in reasoning traces, e.g. "mistral (ollama)".
    fn model_name(&self) -> String;

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Configuration-selected model backend.
pub enum ModelClient {
    Ollama(OllamaClient),
    OpenAiCompatible(OpenAiClient),
}

impl ModelClient {
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Unreachable(e.to_string()))?;

        let client = match config.backend {
            ModelBackend::Ollama => Self::Ollama(OllamaClient {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                model: config.model.clone(),
                temperature: config.temperature,
                timeout_secs: config.timeout_secs,
            }),
            ModelBackend::OpenAiCompatible => Self::OpenAiCompatible(OpenAiClient {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                model: config.model.clone(),
                api_key: config.api_key.clone(),
                temperature: config.temperature,
                timeout_secs: config.timeout_secs,
            }),
        };
        Ok(client)
    }
}

impl NarrativeModel for ModelClient {
    fn model_name(&self) -> String {
        match self {
            Self::Ollama(c) => format!("{} (ollama)", c.model),
            Self::OpenAiCompatible(c) => format!("{} (openai-compatible)", c.model),
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        match self {
            Self::Ollama(c) => c.complete(request).await,
            Self::OpenAiCompatible(c) => c.complete(request).await,
        }
    }
}

fn send_error(e: reqwest::Error, timeout_secs: u64) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout {
            seconds: timeout_secs,
        }
    } else {
        GenerationError::Unreachable(e.to_string())
    }
}

// ── Ollama ────────────────────────────────────────────────────────

/// Client for a local Ollama server (`POST /api/chat`).
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

impl OllamaClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "stream": false,
            "options": { "temperature": self.temperature },
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
        });

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        Ok(parsed.message.content)
    }
}

// ── OpenAI-compatible ─────────────────────────────────────────────

/// Client for any OpenAI-compatible endpoint (`POST /v1/chat/completions`).
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    timeout_secs: u64,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

impl OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
        });

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
            });
        }

        let parsed: OpenAiChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("response has no choices".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_includes_backend() {
        let config = ModelConfig::default();
        let client = ModelClient::from_config(&config).unwrap();
        assert_eq!(client.model_name(), "mistral (ollama)");

        let config = ModelConfig {
            backend: ModelBackend::OpenAiCompatible,
            model: "gpt-4o-mini".to_string(),
            ..ModelConfig::default()
        };
        let client = ModelClient::from_config(&config).unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini (openai-compatible)");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_generation_error() {
        // Nothing listens on the discard port.
        let config = ModelConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..ModelConfig::default()
        };
        let client = ModelClient::from_config(&config).unwrap();

        let result = client
            .complete(&CompletionRequest {
                system: "s".to_string(),
                user: "u".to_string(),
            })
            .await;
        assert!(matches!(
            result,
            Err(GenerationError::Unreachable(_) | GenerationError::Timeout { .. })
        ));
    }
}
