//! Error types for the casetrail-narrative crate.

use thiserror::Error;

/// Generation failures are recoverable: the caller may retry with backoff,
/// and nothing is persisted until a narrative is successfully produced.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model backend unreachable: {0}")]
    Unreachable(String),

    #[error("Model call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Model backend returned HTTP {status}")]
    Http { status: u16 },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Model returned an empty narrative")]
    EmptyOutput,

    #[error("Narrative is missing the mandated {section} section")]
    MissingSection { section: &'static str },
}

pub type Result<T> = std::result::Result<T, GenerationError>;
