//! casetrail-trace — Tamper-evident reasoning capture.
//!
//! Every narrative generation produces a ReasoningTrace: the exact inputs,
//! retrieved grounding context, and model identity behind one generated
//! SAR draft. Traces are immutable, content-hashed with BLAKE3 for tamper
//! evidence, and queryable by case for regulator and QA review.

pub mod hash;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use casetrail_core::{CaseId, SarInput};

/// Globally unique identifier for a reasoning trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TraceId(pub Uuid);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable record of how one SAR narrative was produced.
///
/// The `case_id` is a reference, not ownership — the trace outlives any
/// view of the case and is never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReasoningTrace {
    pub trace_id: TraceId,
    pub case_id: CaseId,
    /// Identity of the model that produced the narrative,
    /// e.g. "mistral (ollama)".
    pub model_name: String,
    /// Full snapshot of the generation inputs: customer profile,
    /// transaction summary, alert reason.
    pub input_signals: SarInput,
    /// The grounding context supplied to the model; possibly empty.
    pub retrieved_context: String,
    pub created_at: DateTime<Utc>,
    /// BLAKE3 content hash (hex) over all other fields.
    pub content_hash: Option<String>,
}

impl ReasoningTrace {
    /// Build a finalized trace: fresh ID, timestamp, and content hash.
    pub fn capture(
        case_id: CaseId,
        model_name: &str,
        input_signals: SarInput,
        retrieved_context: &str,
    ) -> Self {
        let mut trace = Self {
            trace_id: TraceId::new(),
            case_id,
            model_name: model_name.to_string(),
            input_signals,
            retrieved_context: retrieved_context.to_string(),
            created_at: Utc::now(),
            content_hash: None,
        };
        trace.content_hash = Some(trace.compute_hash());
        trace
    }

    /// Compute the BLAKE3 hash of the trace's content.
    /// The hash covers all fields except `content_hash` itself.
    pub fn compute_hash(&self) -> String {
        hash::compute_trace_hash(self)
    }

    /// Verify that the stored content_hash matches a freshly computed hash.
    pub fn verify_integrity(&self) -> bool {
        match &self.content_hash {
            Some(stored) => stored == &self.compute_hash(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casetrail_core::{CustomerProfile, TransactionSummary};

    fn sample_input() -> SarInput {
        SarInput {
            customer_profile: CustomerProfile {
                customer_id: "CUST-001".to_string(),
                customer_name: "John Doe".to_string(),
                risk_score: 65.0,
                declared_income: Some(48_000.0),
                occupation: Some("retail".to_string()),
            },
            transaction_summary: TransactionSummary {
                summary: "Multiple high-value transfers to offshore beneficiaries".to_string(),
                total_amount: Some(182_500.0),
                transaction_count: Some(14),
                window_days: Some(7),
            },
            alert_reason: "Unusual spike in cross-border transactions".to_string(),
        }
    }

    #[test]
    fn capture_finalizes_with_a_valid_hash() {
        let trace = ReasoningTrace::capture(CaseId::new(), "mistral (ollama)", sample_input(), "");
        assert!(trace.content_hash.is_some());
        assert!(trace.verify_integrity());
    }

    #[test]
    fn serialization_roundtrip_is_lossless() {
        let trace = ReasoningTrace::capture(
            CaseId::new(),
            "mistral (ollama)",
            sample_input(),
            "[SOURCE: FATF]\nStructuring involves breaking large transactions into smaller ones.",
        );

        let json = serde_json::to_string(&trace).unwrap();
        let back: ReasoningTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(trace, back);

        // input_signals must survive byte-identically: re-serializing the
        // round-tripped trace reproduces the original bytes.
        assert_eq!(json, serde_json::to_string(&back).unwrap());
        assert!(back.verify_integrity());
    }

    #[test]
    fn tampered_trace_fails_integrity() {
        let mut trace =
            ReasoningTrace::capture(CaseId::new(), "mistral (ollama)", sample_input(), "");
        trace.retrieved_context = "[SOURCE: forged]\nInserted after capture.".to_string();
        assert!(!trace.verify_integrity());
    }

    #[test]
    fn created_at_serializes_iso8601() {
        let trace = ReasoningTrace::capture(CaseId::new(), "stub", sample_input(), "");
        let value = serde_json::to_value(&trace).unwrap();
        let created_at = value.get("created_at").and_then(|v| v.as_str()).unwrap();
        assert!(created_at.contains('T'), "expected ISO-8601, got {created_at}");
    }
}
