//! casetrail-knowledge — Reference-document ingestion and retrieval.
//!
//! Regulatory and SAR reference material (FATF typologies, internal
//! guidance, past filings) is split into overlapping chunks, embedded,
//! and indexed for similarity search. Retrieval returns source-attributed
//! context blocks used to ground narrative generation; an empty result is
//! a defined outcome, not an error.

pub mod config;
pub mod embed;
pub mod error;
pub mod retrieve;
pub mod splitter;
pub mod store;

pub use config::KnowledgeConfig;
pub use embed::{Embedder, HashedTfIdfEmbedder};
pub use error::{EmbedError, IngestionError, KnowledgeError};
pub use retrieve::ContextProvider;
pub use store::{IngestReport, KnowledgeChunk, KnowledgeStore};
