//! Core domain types for the Casetrail case lifecycle.
//!
//! These types are shared across all Casetrail services. Cases are owned
//! exclusively by the registry and mutated only through the transition
//! table in [`crate::machine`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identifiers ───────────────────────────────────────────────────

/// Unique identifier for a case. Immutable for the life of the case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CaseId(pub Uuid);

impl CaseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Case lifecycle ────────────────────────────────────────────────

/// Lifecycle status of a case.
///
/// `ClosedFalsePositive` and `Escalated` are terminal: no transition
/// leaves them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    New,
    UnderReview,
    SarDrafted,
    ClosedFalsePositive,
    Escalated,
}

impl CaseStatus {
    /// Whether this status is absorbing (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ClosedFalsePositive | Self::Escalated)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "NEW",
            Self::UnderReview => "UNDER_REVIEW",
            Self::SarDrafted => "SAR_DRAFTED",
            Self::ClosedFalsePositive => "CLOSED_FALSE_POSITIVE",
            Self::Escalated => "ESCALATED",
        };
        f.write_str(s)
    }
}

/// Analyst actions that drive case transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseAction {
    BeginReview,
    GenerateSar,
    MarkFalsePositive,
    Escalate,
}

/// A suspicious-activity case: the unit of work analysts act on.
///
/// Never deleted, only closed. `risk_score` is validated to [0, 100]
/// at creation time by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub id: CaseId,
    pub customer_id: String,
    pub customer_name: String,
    pub risk_score: f64,
    pub status: CaseStatus,
    pub alert_reason: String,
    pub transaction_summary: String,
    pub created_at: DateTime<Utc>,
}

// ── Generation input signals ──────────────────────────────────────

/// Customer profile supplied to narrative generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub customer_name: String,
    pub risk_score: f64,
    pub declared_income: Option<f64>,
    pub occupation: Option<String>,
}

/// Transaction activity summary supplied to narrative generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionSummary {
    pub summary: String,
    pub total_amount: Option<f64>,
    pub transaction_count: Option<u32>,
    pub window_days: Option<u32>,
}

/// The full input snapshot for one narrative generation: everything the
/// model is allowed to ground its output in, recorded verbatim in the
/// reasoning trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SarInput {
    pub customer_profile: CustomerProfile,
    pub transaction_summary: TransactionSummary,
    pub alert_reason: String,
}

impl SarInput {
    /// Build the generation input from a case's stored fields.
    pub fn from_case(case: &Case) -> Self {
        Self {
            customer_profile: CustomerProfile {
                customer_id: case.customer_id.clone(),
                customer_name: case.customer_name.clone(),
                risk_score: case.risk_score,
                declared_income: None,
                occupation: None,
            },
            transaction_summary: TransactionSummary {
                summary: case.transaction_summary.clone(),
                total_amount: None,
                transaction_count: None,
                window_days: None,
            },
            alert_reason: case.alert_reason.clone(),
        }
    }
}

// ── Audit vocabulary ──────────────────────────────────────────────

/// Fixed vocabulary of auditable actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    CaseCreated,
    SarGenerated,
    Escalated,
    ClosedFalsePositive,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CaseCreated => "case_created",
            Self::SarGenerated => "sar_generated",
            Self::Escalated => "escalated",
            Self::ClosedFalsePositive => "closed_false_positive",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
