//! Error types for the casetrail-knowledge crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Chunk overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    #[error("Embedding failed: {0}")]
    Embed(#[from] EmbedError),
}

/// Per-document ingestion failure. Collected per batch, never fatal to the
/// remaining documents.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Document {index} is empty, nothing to split")]
    EmptyDocument { index: usize },

    #[error("Document {index} could not be embedded: {source}")]
    Embed {
        index: usize,
        #[source]
        source: EmbedError,
    },
}

/// Failure from an embedding provider.
#[derive(Debug, Error)]
#[error("Embedding provider {provider}: {message}")]
pub struct EmbedError {
    pub provider: String,
    pub message: String,
}
