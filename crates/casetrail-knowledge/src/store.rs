//! The knowledge store: an append-only, similarity-searchable chunk index.
//!
//! Ingestion splits documents, embeds each chunk, and appends the finished
//! records under the write lock, so concurrent readers observe either the
//! pre-ingestion or post-ingestion state of a chunk, never a partial one.
//! Chunks are never removed and duplicates are permitted.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::KnowledgeConfig;
use crate::embed::Embedder;
use crate::error::{EmbedError, IngestionError, KnowledgeError};
use crate::splitter::TextSplitter;

/// One indexed fragment of a reference document. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub content: String,
    /// Attached verbatim from the ingestion batch. Retrieval reads the
    /// `source` key for attribution; everything else is opaque.
    pub metadata: HashMap<String, String>,
    /// Embedding vector; opaque to everything but similarity scoring.
    pub embedding: Vec<f32>,
}

/// A retrieval match with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub score: f32,
    pub chunk: KnowledgeChunk,
}

/// Outcome of one ingestion batch. Failures are per-document; the rest of
/// the batch is ingested regardless.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks_added: usize,
    pub failures: Vec<IngestionError>,
}

/// Append-only chunk index with embedding-based similarity search.
pub struct KnowledgeStore {
    embedder: Arc<dyn Embedder>,
    splitter: TextSplitter,
    similarity_floor: f32,
    chunks: RwLock<Vec<KnowledgeChunk>>,
}

impl KnowledgeStore {
    pub fn new(
        config: &KnowledgeConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, KnowledgeError> {
        let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self {
            embedder,
            splitter,
            similarity_floor: config.similarity_floor,
            chunks: RwLock::new(Vec::new()),
        })
    }

    /// Ingest a batch of raw documents, attaching `metadata` to every chunk.
    ///
    /// Each document is split and embedded before anything is published;
    /// a document's chunks become visible to readers atomically. Documents
    /// that cannot be split or embedded are reported in the result and the
    /// batch continues.
    pub fn ingest(&self, documents: &[String], metadata: &HashMap<String, String>) -> IngestReport {
        let mut report = IngestReport {
            documents: documents.len(),
            ..Default::default()
        };

        for (index, document) in documents.iter().enumerate() {
            let pieces = self.splitter.split(document);
            if pieces.is_empty() {
                report.failures.push(IngestionError::EmptyDocument { index });
                continue;
            }

            let mut prepared = Vec::with_capacity(pieces.len());
            let mut embed_failure = None;
            for content in pieces {
                match self.embedder.embed(&content) {
                    Ok(embedding) => prepared.push(KnowledgeChunk {
                        content,
                        metadata: metadata.clone(),
                        embedding,
                    }),
                    Err(source) => {
                        embed_failure = Some(IngestionError::Embed { index, source });
                        break;
                    }
                }
            }

            if let Some(failure) = embed_failure {
                report.failures.push(failure);
                continue;
            }

            report.chunks_added += prepared.len();
            let mut index_guard = self.chunks.write().expect("knowledge index lock poisoned");
            index_guard.extend(prepared);
        }

        tracing::info!(
            documents = report.documents,
            chunks_added = report.chunks_added,
            failures = report.failures.len(),
            "Ingestion batch complete"
        );

        report
    }

    /// Top-k similarity search. Matches must exceed the similarity floor;
    /// ties are broken by insertion order (stable sort over an append-only
    /// index). Returns an empty vec on an empty index.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, EmbedError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(query)?;
        let index_guard = self.chunks.read().expect("knowledge index lock poisoned");

        let mut scored: Vec<ScoredChunk> = index_guard
            .iter()
            .map(|chunk| ScoredChunk {
                score: dot(&query_vec, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .filter(|s| s.score > self.similarity_floor)
            .collect();
        drop(index_guard);

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.chunks.read().expect("knowledge index lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dot product over equal-length vectors; embeddings are unit-normalized so
/// this is cosine similarity. Mismatched lengths score zero.
fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashedTfIdfEmbedder;

    fn store() -> KnowledgeStore {
        let config = KnowledgeConfig::default();
        KnowledgeStore::new(&config, Arc::new(HashedTfIdfEmbedder::new(256))).unwrap()
    }

    fn meta(source: &str) -> HashMap<String, String> {
        HashMap::from([("source".to_string(), source.to_string())])
    }

    #[test]
    fn ingest_grows_index_and_keeps_metadata_verbatim() {
        let store = store();
        let mut metadata = meta("FATF");
        metadata.insert("year".to_string(), "2023".to_string());

        let report = store.ingest(
            &["Structuring involves breaking large transactions into smaller ones.".to_string()],
            &metadata,
        );
        assert_eq!(report.chunks_added, 1);
        assert!(report.failures.is_empty());

        let matches = store.search("structuring", 1).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].chunk.metadata, metadata);
    }

    #[test]
    fn duplicate_ingestion_produces_duplicate_chunks() {
        let store = store();
        let docs = vec!["Layering obscures the origin of illicit funds.".to_string()];
        store.ingest(&docs, &meta("FATF"));
        store.ingest(&docs, &meta("FATF"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn empty_document_fails_without_sinking_the_batch() {
        let store = store();
        let docs = vec![
            "   ".to_string(),
            "Placement introduces cash into the financial system.".to_string(),
        ];
        let report = store.ingest(&docs, &meta("FATF"));

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0],
            IngestionError::EmptyDocument { index: 0 }
        ));
        assert_eq!(report.chunks_added, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn search_returns_at_most_k() {
        let store = store();
        let docs: Vec<String> = (0..5)
            .map(|i| format!("Guidance note {i} on suspicious transaction reporting."))
            .collect();
        store.ingest(&docs, &meta("internal"));

        let matches = store.search("suspicious transaction reporting", 3).unwrap();
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn search_on_empty_index_returns_nothing() {
        let store = store();
        assert!(store.search("anything", 4).unwrap().is_empty());
    }

    #[test]
    fn unrelated_queries_fall_below_the_floor() {
        let store = store();
        store.ingest(
            &["Trade-based laundering misrepresents invoice values.".to_string()],
            &meta("FATF"),
        );
        // No shared terms: cosine similarity is exactly zero, which does
        // not exceed the default floor.
        let matches = store.search("qwzx", 4).unwrap();
        assert!(matches.is_empty());
    }
}
