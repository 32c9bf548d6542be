//! Configuration for narrative generation.

use serde::Deserialize;

use crate::prompt::PromptVariant;

/// Model backend configuration.
///
/// Loaded from `casetrail.toml` `[model]` section or
/// `CASETRAIL__MODEL__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Which backend to talk to.
    #[serde(default)]
    pub backend: ModelBackend,

    /// Model identifier understood by the backend (default: "mistral").
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the backend API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for OpenAI-compatible backends.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Decoding temperature. Kept low: compliance narratives should be
    /// stylistically consistent for identical inputs.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Timeout for a single model call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Which SAR section structure to mandate.
    #[serde(default)]
    pub prompt_variant: PromptVariant,
}

/// Provider-swappable model backends, selected at construction time.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackend {
    /// Local Ollama server (`/api/chat`).
    #[default]
    Ollama,
    /// Any OpenAI-compatible endpoint (`/v1/chat/completions`).
    OpenAiCompatible,
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::default(),
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            prompt_variant: PromptVariant::default(),
        }
    }
}
