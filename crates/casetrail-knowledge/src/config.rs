//! Configuration for the knowledge store.

use serde::Deserialize;

/// Knowledge store configuration.
///
/// Loaded from `casetrail.toml` `[knowledge]` section or
/// `CASETRAIL__KNOWLEDGE__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    /// Target chunk size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, in characters.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Cosine similarity a match must exceed to be returned.
    #[serde(default)]
    pub similarity_floor: f32,

    /// Dimensionality of the embedding vectors.
    #[serde(default = "default_dimensions")]
    pub embedding_dimensions: usize,
}

fn default_chunk_size() -> usize {
    800
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_dimensions() -> usize {
    256
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            similarity_floor: 0.0,
            embedding_dimensions: default_dimensions(),
        }
    }
}
