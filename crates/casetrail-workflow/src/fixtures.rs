//! Demo seed data: an external collaborator, not part of the core.
//!
//! The workflow behaves identically whether cases arrive from these
//! fixtures or a real intake feed; this module only exists so the CLI can
//! demonstrate an end-to-end run without a case-management integration.

use std::collections::HashMap;

use casetrail_core::Case;
use casetrail_knowledge::KnowledgeStore;
use casetrail_narrative::NarrativeModel;

use crate::error::WorkflowError;
use crate::registry::NewCase;
use crate::workflow::SarWorkflow;

/// Demo cases mirroring typical alert-queue entries.
pub fn demo_cases() -> Vec<NewCase> {
    vec![
        NewCase {
            customer_id: "CUST-001".to_string(),
            customer_name: "John Doe".to_string(),
            risk_score: 65.0,
            alert_reason: "Unusual spike in cross-border transactions exceeding typical monthly volume.".to_string(),
            transaction_summary: "Multiple high-value transfers to newly added offshore beneficiaries within 7 days.".to_string(),
        },
        NewCase {
            customer_id: "CUST-002".to_string(),
            customer_name: "Acme Trading Ltd".to_string(),
            risk_score: 86.5,
            alert_reason: "Repeated cash deposits just below the reporting threshold.".to_string(),
            transaction_summary: "14 cash deposits between 9,000 and 9,900 across three branches in 10 days.".to_string(),
        },
    ]
}

/// Regulatory reference batches: (documents, shared metadata per batch).
pub fn reference_batches() -> Vec<(Vec<String>, HashMap<String, String>)> {
    vec![
        (
            vec![
                "Structuring involves breaking large transactions into smaller ones to evade reporting thresholds. Indicators include repeated deposits just below the threshold, often across multiple branches or accounts.".to_string(),
                "Layering obscures the origin of illicit funds through rapid movement between accounts, jurisdictions, or instruments, frequently involving newly established offshore beneficiaries.".to_string(),
            ],
            HashMap::from([("source".to_string(), "FATF".to_string())]),
        ),
        (
            vec![
                "A SAR narrative should state what triggered the alert, describe the observed activity objectively, and explain why the activity is inconsistent with the customer's known profile. Avoid accusatory language.".to_string(),
            ],
            HashMap::from([("source".to_string(), "internal-guidance".to_string())]),
        ),
    ]
}

/// Ingest the reference corpus and open the demo cases.
pub fn seed<M: NarrativeModel>(
    workflow: &SarWorkflow<M>,
    store: &KnowledgeStore,
) -> Result<Vec<Case>, WorkflowError> {
    for (documents, metadata) in reference_batches() {
        let report = store.ingest(&documents, &metadata);
        for failure in &report.failures {
            tracing::warn!(error = %failure, "Seed document skipped");
        }
    }

    demo_cases()
        .into_iter()
        .map(|new_case| workflow.create_case(new_case))
        .collect()
}
