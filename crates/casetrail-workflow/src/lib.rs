//! casetrail-workflow — case lifecycle orchestration.
//!
//! Owns the case registry, the append-only audit log, and the
//! "Generate SAR" workflow that wires retrieval, narrative generation,
//! trace capture, state transition, and audit recording together:
//!
//! retrieve context → generate narrative → capture trace → record audit
//! entry → commit the SAR_DRAFTED transition.
//!
//! Generation is serialized per case: a second concurrent request for the
//! same case is rejected rather than racing to an inconsistent state.

pub mod audit;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod registry;
pub mod workflow;

pub use audit::{AuditLogEntry, AuditStore, AuditStoreError, InMemoryAuditStore, JsonlAuditStore};
pub use config::AppConfig;
pub use error::{PersistenceError, WorkflowError};
pub use registry::{CaseRegistry, NewCase};
pub use workflow::{SarOutcome, SarWorkflow};
