//! The "Generate SAR" orchestration workflow.
//!
//! One analyst action drives: retrieve context → generate narrative →
//! capture reasoning trace → record audit entry → commit the case
//! transition. The transition is pre-validated under the per-case guard
//! before anything is persisted, so the commit at the end cannot fail and
//! the triad (trace, transition, audit entry) is all-or-nothing.
//!
//! Per-case serialization: at most one generation workflow is in flight
//! per case; a second concurrent request is rejected with
//! [`WorkflowError::ConcurrentGeneration`]. Different cases proceed fully
//! in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;

use casetrail_core::{AuditAction, Case, CaseAction, CaseId, SarInput};
use casetrail_knowledge::ContextProvider;
use casetrail_narrative::{NarrativeModel, SarGenerator};
use casetrail_trace::store::{TraceStore, TraceStoreError};
use casetrail_trace::ReasoningTrace;

use crate::audit::{AuditLogEntry, AuditStore};
use crate::error::{PersistenceError, WorkflowError};
use crate::registry::{CaseRegistry, NewCase};

/// Everything a successful generation produced.
#[derive(Debug)]
pub struct SarOutcome {
    pub case: Case,
    pub narrative: String,
    pub trace: ReasoningTrace,
    pub audit_entry: AuditLogEntry,
}

/// Orchestrates case actions over the registry, retrieval, generation,
/// trace, and audit components.
pub struct SarWorkflow<M> {
    registry: CaseRegistry,
    retrieval: ContextProvider,
    generator: SarGenerator<M>,
    traces: Arc<dyn TraceStore>,
    audit: Arc<dyn AuditStore>,
    guards: Mutex<HashMap<CaseId, Arc<AsyncMutex<()>>>>,
    retrieval_k: usize,
}

impl<M: NarrativeModel> SarWorkflow<M> {
    pub fn new(
        retrieval: ContextProvider,
        generator: SarGenerator<M>,
        traces: Arc<dyn TraceStore>,
        audit: Arc<dyn AuditStore>,
        retrieval_k: usize,
    ) -> Self {
        Self {
            registry: CaseRegistry::new(),
            retrieval,
            generator,
            traces,
            audit,
            guards: Mutex::new(HashMap::new()),
            retrieval_k,
        }
    }

    /// Open a case and record its `case_created` audit entry.
    pub fn create_case(&self, new_case: NewCase) -> Result<Case, WorkflowError> {
        let case = self.registry.create(new_case)?;
        self.audit
            .record(
                case.id,
                AuditAction::CaseCreated,
                json!({
                    "customer_id": case.customer_id,
                    "risk_score": case.risk_score,
                }),
            )
            .map_err(|e| WorkflowError::Persistence {
                narrative: None,
                source: e.into(),
            })?;
        Ok(case)
    }

    /// Run the full generate-SAR workflow for one case.
    ///
    /// On [`WorkflowError::Generation`] nothing has been persisted and the
    /// case status is unchanged; the caller may retry with backoff. On
    /// [`WorkflowError::Persistence`] the generated narrative is retained
    /// in the error so persistence can be retried without re-invoking the
    /// model.
    pub async fn generate_sar(&self, case_id: CaseId) -> Result<SarOutcome, WorkflowError> {
        let guard = self.guard_for(case_id);
        let Ok(_permit) = guard.try_lock() else {
            return Err(WorkflowError::ConcurrentGeneration(case_id));
        };

        let case = self.registry.get(case_id)?;
        // Fail fast before any model call or persistence.
        case.status.apply(CaseAction::GenerateSar)?;

        let context = self.retrieval.retrieve(&case.alert_reason, self.retrieval_k);
        let input = SarInput::from_case(&case);
        let narrative = self.generator.generate(&input, &context).await?;

        let model_name = self.generator.model_name();
        let trace = self
            .traces
            .capture(case_id, &model_name, input, &context)
            .map_err(|e| WorkflowError::Persistence {
                narrative: Some(narrative.clone()),
                source: e.into(),
            })?;

        let details = serde_json::to_value(&trace).map_err(|e| WorkflowError::Persistence {
            narrative: Some(narrative.clone()),
            source: PersistenceError::Trace(TraceStoreError::Serialization(e)),
        })?;
        let audit_entry = self
            .audit
            .record(case_id, AuditAction::SarGenerated, details)
            .map_err(|e| WorkflowError::Persistence {
                narrative: Some(narrative.clone()),
                source: e.into(),
            })?;

        // Pre-validated above while holding the guard; cannot fail now.
        let case = self.registry.transition(case_id, CaseAction::GenerateSar)?;

        tracing::info!(
            case_id = %case_id,
            trace_id = %trace.trace_id,
            audit_id = audit_entry.id,
            "SAR draft generated"
        );

        Ok(SarOutcome {
            case,
            narrative,
            trace,
            audit_entry,
        })
    }

    /// NEW → UNDER_REVIEW. Not audited: the fixed audit vocabulary covers
    /// creation, generation, escalation, and closure only.
    pub async fn begin_review(&self, case_id: CaseId) -> Result<Case, WorkflowError> {
        let guard = self.guard_for(case_id);
        let _permit = guard.lock().await;
        self.registry.transition(case_id, CaseAction::BeginReview)
    }

    /// Escalate the case (terminal) and record the audit entry.
    pub async fn escalate(&self, case_id: CaseId) -> Result<Case, WorkflowError> {
        self.close_with(case_id, CaseAction::Escalate, AuditAction::Escalated)
            .await
    }

    /// Close the case as a false positive (terminal) and record the audit
    /// entry.
    pub async fn close_false_positive(&self, case_id: CaseId) -> Result<Case, WorkflowError> {
        self.close_with(
            case_id,
            CaseAction::MarkFalsePositive,
            AuditAction::ClosedFalsePositive,
        )
        .await
    }

    async fn close_with(
        &self,
        case_id: CaseId,
        action: CaseAction,
        audit_action: AuditAction,
    ) -> Result<Case, WorkflowError> {
        let guard = self.guard_for(case_id);
        let _permit = guard.lock().await;

        let case = self.registry.get(case_id)?;
        // Same ordering as generation: validate, persist, then commit.
        case.status.apply(action)?;

        self.audit
            .record(case_id, audit_action, json!({ "from": case.status }))
            .map_err(|e| WorkflowError::Persistence {
                narrative: None,
                source: e.into(),
            })?;

        self.registry.transition(case_id, action)
    }

    pub fn case(&self, case_id: CaseId) -> Result<Case, WorkflowError> {
        self.registry.get(case_id)
    }

    pub fn traces_for(&self, case_id: CaseId) -> Result<Vec<ReasoningTrace>, WorkflowError> {
        self.traces
            .traces_for(case_id)
            .map_err(|e| WorkflowError::Persistence {
                narrative: None,
                source: e.into(),
            })
    }

    pub fn history(&self, case_id: CaseId) -> Result<Vec<AuditLogEntry>, WorkflowError> {
        self.audit
            .history(case_id)
            .map_err(|e| WorkflowError::Persistence {
                narrative: None,
                source: e.into(),
            })
    }

    fn guard_for(&self, case_id: CaseId) -> Arc<AsyncMutex<()>> {
        self.guards
            .lock()
            .expect("workflow guard map lock poisoned")
            .entry(case_id)
            .or_default()
            .clone()
    }
}
