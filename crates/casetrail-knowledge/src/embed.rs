//! Embedding provider abstraction.
//!
//! The core treats embeddings as opaque vectors; which model produces them
//! is a configuration concern. The default provider hashes terms into a
//! fixed-dimension vector weighted by term frequency — deterministic, with
//! no external service, so ingestion and tests behave identically in
//! air-gapped environments. A neural provider can be swapped in behind the
//! same trait.

use std::collections::HashMap;

use crate::error::EmbedError;

/// Produces fixed-dimension embedding vectors for similarity search.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Dimensionality of every vector this provider returns.
    fn dimensions(&self) -> usize;

    /// Provider identity, recorded for diagnostics.
    fn name(&self) -> &str;
}

/// Deterministic hashed term-frequency embedder.
///
/// Terms are lowercased, hashed into buckets with FNV-1a, and weighted by
/// in-document frequency with a length-based IDF approximation. Vectors
/// are L2-normalized so cosine similarity reduces to a dot product.
pub struct HashedTfIdfEmbedder {
    dimensions: usize,
}

impl HashedTfIdfEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(term: &str, dims: usize) -> usize {
        // FNV-1a
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= u64::from(*b);
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % dims
    }

    fn terms(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|t| t.len() >= 2)
            .map(str::to_lowercase)
            .collect()
    }
}

impl Embedder for HashedTfIdfEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let terms = Self::terms(text);
        let mut vector = vec![0.0f32; self.dimensions];
        if terms.is_empty() {
            return Ok(vector);
        }

        let mut counts: HashMap<&str, f32> = HashMap::new();
        for term in &terms {
            *counts.entry(term).or_default() += 1.0;
        }

        let total = terms.len() as f32;
        for (term, count) in &counts {
            let tf = count / total;
            // Longer terms carry more signal; short ones are mostly stopwords.
            let idf = 1.0 + (term.len() as f32).ln();
            vector[Self::bucket(term, self.dimensions)] += tf * idf;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashed-tfidf"
    }
}
