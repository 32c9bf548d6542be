//! casetrail-core: Shared domain types and the case state machine.
//!
//! This crate provides the foundational types used across all Casetrail
//! components:
//! - Case entities and their closed status/action enums
//! - Typed input signals for narrative generation (customer profile,
//!   transaction summary, alert reason)
//! - The audit action vocabulary
//! - The pure case lifecycle transition table

pub mod machine;
pub mod types;

pub use machine::InvalidTransition;
pub use types::{
    AuditAction, Case, CaseAction, CaseId, CaseStatus, CustomerProfile, SarInput,
    TransactionSummary,
};
