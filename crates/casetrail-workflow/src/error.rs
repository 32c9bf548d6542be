//! Error types for the casetrail-workflow crate.

use thiserror::Error;

use casetrail_core::{CaseId, InvalidTransition};
use casetrail_narrative::GenerationError;
use casetrail_trace::store::TraceStoreError;

use crate::audit::AuditStoreError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad input to case creation; nothing is stored.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Case not found: {0}")]
    CaseNotFound(CaseId),

    /// Illegal state change; the case is left unchanged.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// Another SAR generation is already in flight for this case.
    /// Retry after it completes.
    #[error("A SAR generation is already in flight for case {0}")]
    ConcurrentGeneration(CaseId),

    /// Model failure; nothing was persisted and the caller may retry.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A store failed. When a narrative had already been produced it is
    /// retained here so the caller can retry persistence without
    /// re-invoking the model.
    #[error("Persistence failed: {source}")]
    Persistence {
        narrative: Option<String>,
        #[source]
        source: PersistenceError,
    },
}

/// Storage-layer failure from one of the append-only stores.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Trace store: {0}")]
    Trace(#[from] TraceStoreError),

    #[error("Audit store: {0}")]
    Audit(#[from] AuditStoreError),
}
