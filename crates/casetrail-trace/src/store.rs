//! Trace storage — trait + in-memory arena + JSON-file implementation.
//!
//! Both backends are pure append: a capture never mutates or removes an
//! existing trace, and a successful capture is durably stored before it
//! returns. `traces_for` orders by `created_at` ascending and yields an
//! empty sequence (not an error) for unknown cases.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use casetrail_core::{CaseId, SarInput};

use crate::{ReasoningTrace, TraceId};

/// Errors from trace storage operations.
#[derive(Debug, thiserror::Error)]
pub enum TraceStoreError {
    #[error("Integrity check failed for trace {0}: stored hash does not match content")]
    IntegrityViolation(TraceId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for trace persistence backends.
pub trait TraceStore: Send + Sync {
    /// Capture a new trace: allocate its ID, stamp `created_at`, store it,
    /// and return it. Append-only.
    fn capture(
        &self,
        case_id: CaseId,
        model_name: &str,
        input_signals: SarInput,
        retrieved_context: &str,
    ) -> Result<ReasoningTrace, TraceStoreError>;

    /// All traces recorded for a case, ordered by `created_at` ascending.
    fn traces_for(&self, case_id: CaseId) -> Result<Vec<ReasoningTrace>, TraceStoreError>;
}

// ── In-memory arena store ─────────────────────────────────────────

#[derive(Default)]
struct Arena {
    traces: Vec<ReasoningTrace>,
    by_case: HashMap<CaseId, Vec<usize>>,
}

/// Arena-backed trace store: traces live in one append-only vec with a
/// per-case index. Capture order equals `created_at` order.
#[derive(Default)]
pub struct InMemoryTraceStore {
    inner: RwLock<Arena>,
}

impl InMemoryTraceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TraceStore for InMemoryTraceStore {
    fn capture(
        &self,
        case_id: CaseId,
        model_name: &str,
        input_signals: SarInput,
        retrieved_context: &str,
    ) -> Result<ReasoningTrace, TraceStoreError> {
        let trace = ReasoningTrace::capture(case_id, model_name, input_signals, retrieved_context);

        let mut arena = self.inner.write().expect("trace arena lock poisoned");
        let slot = arena.traces.len();
        arena.traces.push(trace.clone());
        arena.by_case.entry(case_id).or_default().push(slot);
        drop(arena);

        tracing::debug!(trace_id = %trace.trace_id, case_id = %case_id, "Trace captured");
        Ok(trace)
    }

    fn traces_for(&self, case_id: CaseId) -> Result<Vec<ReasoningTrace>, TraceStoreError> {
        let arena = self.inner.read().expect("trace arena lock poisoned");
        let traces = arena
            .by_case
            .get(&case_id)
            .map(|slots| slots.iter().map(|&i| arena.traces[i].clone()).collect())
            .unwrap_or_default();
        Ok(traces)
    }
}

// ── JSON-file store ───────────────────────────────────────────────

/// File-system backed trace store.
///
/// Stores traces as JSON files in a directory tree:
/// ```text
/// {root}/
///   2026/
///     08/
///       29/
///         {trace_id}.json
/// ```
pub struct JsonTraceStore {
    root: PathBuf,
}

impl JsonTraceStore {
    /// Create a new store rooted at the given directory.
    /// Creates the directory if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, TraceStoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn trace_path(&self, trace: &ReasoningTrace) -> PathBuf {
        let date = trace.created_at.format("%Y/%m/%d");
        self.root.join(format!("{}/{}.json", date, trace.trace_id.0))
    }
}

impl TraceStore for JsonTraceStore {
    fn capture(
        &self,
        case_id: CaseId,
        model_name: &str,
        input_signals: SarInput,
        retrieved_context: &str,
    ) -> Result<ReasoningTrace, TraceStoreError> {
        let trace = ReasoningTrace::capture(case_id, model_name, input_signals, retrieved_context);

        let path = self.trace_path(&trace);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&trace)?;
        fs::write(&path, json)?;

        tracing::debug!(
            trace_id = %trace.trace_id,
            path = %path.display(),
            "Trace saved"
        );

        Ok(trace)
    }

    fn traces_for(&self, case_id: CaseId) -> Result<Vec<ReasoningTrace>, TraceStoreError> {
        let mut results = Vec::new();
        collect_traces_recursive(&self.root, case_id, &mut results)?;
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(results)
    }
}

/// Recursively collect traces for a case, verifying integrity on read.
fn collect_traces_recursive(
    dir: &Path,
    case_id: CaseId,
    results: &mut Vec<ReasoningTrace>,
) -> Result<(), TraceStoreError> {
    if !dir.is_dir() {
        return Ok(());
    }

    let entries = fs::read_dir(dir)?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_traces_recursive(&path, case_id, results)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            let json = fs::read_to_string(&path)?;
            let trace: ReasoningTrace = serde_json::from_str(&json)?;

            if trace.case_id != case_id {
                continue;
            }
            if !trace.verify_integrity() {
                return Err(TraceStoreError::IntegrityViolation(trace.trace_id));
            }
            results.push(trace);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use casetrail_core::{CustomerProfile, TransactionSummary};

    fn sample_input(customer_id: &str) -> SarInput {
        SarInput {
            customer_profile: CustomerProfile {
                customer_id: customer_id.to_string(),
                customer_name: "Test Customer".to_string(),
                risk_score: 72.0,
                declared_income: None,
                occupation: None,
            },
            transaction_summary: TransactionSummary {
                summary: "Repeated sub-threshold cash deposits".to_string(),
                total_amount: None,
                transaction_count: None,
                window_days: None,
            },
            alert_reason: "Possible structuring".to_string(),
        }
    }

    #[test]
    fn in_memory_capture_and_query() {
        let store = InMemoryTraceStore::new();
        let case = CaseId::new();

        let t1 = store.capture(case, "stub", sample_input("CUST-010"), "").unwrap();
        let t2 = store.capture(case, "stub", sample_input("CUST-010"), "ctx").unwrap();
        store.capture(CaseId::new(), "stub", sample_input("CUST-011"), "").unwrap();

        let traces = store.traces_for(case).unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].trace_id, t1.trace_id);
        assert_eq!(traces[1].trace_id, t2.trace_id);
        assert!(traces[0].created_at <= traces[1].created_at);
    }

    #[test]
    fn in_memory_unknown_case_is_empty_not_error() {
        let store = InMemoryTraceStore::new();
        assert!(store.traces_for(CaseId::new()).unwrap().is_empty());
    }

    #[test]
    fn json_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path()).unwrap();
        let case = CaseId::new();

        let saved = store
            .capture(case, "mistral (ollama)", sample_input("CUST-020"), "[SOURCE: FATF]\n...")
            .unwrap();

        let traces = store.traces_for(case).unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0], saved);
        assert!(traces[0].verify_integrity());
    }

    #[test]
    fn json_store_detects_tampering() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path()).unwrap();
        let case = CaseId::new();

        let saved = store.capture(case, "stub", sample_input("CUST-021"), "").unwrap();

        // Tamper with the file on disk: change the retrieved context.
        let path = store.trace_path(&saved);
        let mut tampered: ReasoningTrace =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        tampered.retrieved_context = "FORGED".to_string();
        fs::write(&path, serde_json::to_string_pretty(&tampered).unwrap()).unwrap();

        let result = store.traces_for(case);
        assert!(matches!(result, Err(TraceStoreError::IntegrityViolation(_))));
    }

    #[test]
    fn json_store_filters_by_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path()).unwrap();
        let case_a = CaseId::new();
        let case_b = CaseId::new();

        store.capture(case_a, "stub", sample_input("CUST-030"), "").unwrap();
        store.capture(case_b, "stub", sample_input("CUST-031"), "").unwrap();
        store.capture(case_a, "stub", sample_input("CUST-030"), "").unwrap();

        assert_eq!(store.traces_for(case_a).unwrap().len(), 2);
        assert_eq!(store.traces_for(case_b).unwrap().len(), 1);
    }
}
