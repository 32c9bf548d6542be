//! Retrieval context formatting.
//!
//! Turns top-k knowledge matches into the attributed context string fed to
//! narrative generation:
//!
//! ```text
//! [SOURCE: FATF]
//! Structuring involves breaking large transactions into smaller ones.
//!
//! [SOURCE: internal-guidance]
//! ...
//! ```
//!
//! An empty string means "no grounding available" — a defined outcome that
//! downstream generation must tolerate, never an error.

use std::sync::Arc;

use crate::store::KnowledgeStore;

/// Default attribution when chunk metadata carries no `source` key.
const UNKNOWN_SOURCE: &str = "unknown";

/// Provides source-attributed grounding context for a query.
#[derive(Clone)]
pub struct ContextProvider {
    store: Arc<KnowledgeStore>,
}

impl ContextProvider {
    pub fn new(store: Arc<KnowledgeStore>) -> Self {
        Self { store }
    }

    /// Retrieve at most `k` attributed context blocks for `query`, joined
    /// by one blank line. Returns an empty string when the index is empty,
    /// nothing exceeds the similarity floor, or the search itself fails —
    /// grounding is best-effort and never propagates an error.
    pub fn retrieve(&self, query: &str, k: usize) -> String {
        let matches = match self.store.search(query, k) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Retrieval failed, degrading to empty context");
                return String::new();
            }
        };

        if matches.is_empty() {
            return String::new();
        }

        tracing::debug!(query, hits = matches.len(), "Retrieved grounding context");

        matches
            .iter()
            .map(|m| {
                let source = m
                    .chunk
                    .metadata
                    .get("source")
                    .map(String::as_str)
                    .unwrap_or(UNKNOWN_SOURCE);
                format!("[SOURCE: {source}]\n{}", m.chunk.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
