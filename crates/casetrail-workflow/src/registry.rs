//! The case registry: exclusive owner of Case entities.
//!
//! Cases are created validated, mutated only through the transition table,
//! and never deleted. A failed transition leaves the case untouched; the
//! registry's write lock makes each transition atomic. Serialization of
//! whole workflows per case (generation vs. other actions) is layered on
//! top by [`crate::workflow::SarWorkflow`].

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use casetrail_core::{Case, CaseAction, CaseId, CaseStatus};

use crate::error::WorkflowError;

/// Analyst-facing inputs for opening a case.
#[derive(Debug, Clone)]
pub struct NewCase {
    pub customer_id: String,
    pub customer_name: String,
    pub risk_score: f64,
    pub alert_reason: String,
    pub transaction_summary: String,
}

/// In-memory case registry.
#[derive(Default)]
pub struct CaseRegistry {
    cases: RwLock<HashMap<CaseId, Case>>,
}

impl CaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new case in `NEW` status. Fails with a validation error —
    /// storing nothing — if `risk_score` is outside [0, 100].
    pub fn create(&self, new_case: NewCase) -> Result<Case, WorkflowError> {
        if !new_case.risk_score.is_finite() || !(0.0..=100.0).contains(&new_case.risk_score) {
            return Err(WorkflowError::Validation(format!(
                "risk_score {} outside [0, 100]",
                new_case.risk_score
            )));
        }

        let case = Case {
            id: CaseId::new(),
            customer_id: new_case.customer_id,
            customer_name: new_case.customer_name,
            risk_score: new_case.risk_score,
            status: CaseStatus::New,
            alert_reason: new_case.alert_reason,
            transaction_summary: new_case.transaction_summary,
            created_at: Utc::now(),
        };

        let mut cases = self.cases.write().expect("case registry lock poisoned");
        cases.insert(case.id, case.clone());
        drop(cases);

        tracing::info!(case_id = %case.id, customer_id = %case.customer_id, "Case created");
        Ok(case)
    }

    pub fn get(&self, id: CaseId) -> Result<Case, WorkflowError> {
        self.cases
            .read()
            .expect("case registry lock poisoned")
            .get(&id)
            .cloned()
            .ok_or(WorkflowError::CaseNotFound(id))
    }

    /// Apply an action to a case under the write lock. On an illegal
    /// action the case is unchanged and the transition error is returned.
    pub fn transition(&self, id: CaseId, action: CaseAction) -> Result<Case, WorkflowError> {
        let mut cases = self.cases.write().expect("case registry lock poisoned");
        let case = cases.get_mut(&id).ok_or(WorkflowError::CaseNotFound(id))?;

        let next = case.status.apply(action)?;
        case.status = next;
        let updated = case.clone();
        drop(cases);

        tracing::info!(case_id = %id, action = ?action, status = %updated.status, "Case transitioned");
        Ok(updated)
    }

    pub fn len(&self) -> usize {
        self.cases.read().expect("case registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
