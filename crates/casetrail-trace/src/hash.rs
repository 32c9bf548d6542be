//! BLAKE3 content hashing for tamper evidence.
//!
//! Computes a deterministic hash of all trace fields (excluding the
//! content_hash itself) so that any modification is detectable.

use serde::Serialize;

use crate::ReasoningTrace;

/// Hashable representation of a ReasoningTrace (excludes content_hash).
#[derive(Serialize)]
struct HashableTrace<'a> {
    trace_id: &'a crate::TraceId,
    case_id: &'a casetrail_core::CaseId,
    model_name: &'a str,
    input_signals: &'a casetrail_core::SarInput,
    retrieved_context: &'a str,
    created_at: &'a chrono::DateTime<chrono::Utc>,
}

/// Compute the BLAKE3 hash of a trace's content.
///
/// Serializes all fields except `content_hash` to canonical JSON,
/// then hashes the bytes with BLAKE3. Returns the hex-encoded hash.
pub fn compute_trace_hash(trace: &ReasoningTrace) -> String {
    let hashable = HashableTrace {
        trace_id: &trace.trace_id,
        case_id: &trace.case_id,
        model_name: &trace.model_name,
        input_signals: &trace.input_signals,
        retrieved_context: &trace.retrieved_context,
        created_at: &trace.created_at,
    };

    let json = serde_json::to_vec(&hashable).expect("Trace serialization should not fail");
    blake3::hash(&json).to_hex().to_string()
}
