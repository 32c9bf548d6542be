//! Application configuration.
//!
//! Loaded from (in priority order): `CASETRAIL__`-prefixed environment
//! variables, then `casetrail.toml`, then defaults.

use serde::Deserialize;

use casetrail_knowledge::KnowledgeConfig;
use casetrail_narrative::ModelConfig;

/// Top-level configuration for the casetrail binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// How many context chunks to retrieve per generation.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,
}

/// Where the append-only stores live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for reasoning trace JSON files.
    #[serde(default = "default_trace_dir")]
    pub trace_dir: String,

    /// Path of the append-only audit JSONL file.
    #[serde(default = "default_audit_log")]
    pub audit_log: String,
}

fn default_retrieval_k() -> usize {
    4
}

fn default_trace_dir() -> String {
    "./traces".to_string()
}

fn default_audit_log() -> String {
    "./audit.jsonl".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            knowledge: KnowledgeConfig::default(),
            model: ModelConfig::default(),
            storage: StorageConfig::default(),
            retrieval_k: default_retrieval_k(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            trace_dir: default_trace_dir(),
            audit_log: default_audit_log(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `{file_prefix}.toml` (optional) and
    /// `CASETRAIL__` environment variables.
    pub fn load(file_prefix: &str) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("CASETRAIL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        cfg.try_deserialize()
    }
}
