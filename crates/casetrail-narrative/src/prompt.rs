//! The fixed two-role SAR prompt.
//!
//! The system instruction is immutable: formal, non-accusatory,
//! regulator-ready tone, grounded strictly in the provided data, with a
//! mandatory section structure. The human turn carries the serialized
//! case inputs and, when available, the retrieved reference context.

use serde::Deserialize;

use casetrail_core::SarInput;

const SYSTEM_PROMPT_STANDARD: &str = "\
You are a compliance-grade assistant helping a bank analyst draft a Suspicious Activity Report (SAR).

Rules you MUST follow:
- Write in formal, regulator-ready language
- Do NOT make accusations; describe observations objectively
- Base reasoning strictly on the provided data and reference context
- Be concise, structured, and explainable

Output format MUST be:

SITUATION:
<what triggered the alert>

ASSESSMENT:
<analysis of transactions and risk indicators>

RECOMMENDATION:
<why this activity merits SAR consideration>
";

const SYSTEM_PROMPT_EXTENDED: &str = "\
You are a compliance-grade assistant helping a bank analyst draft a Suspicious Activity Report (SAR).

Rules you MUST follow:
- Write in formal, regulator-ready language
- Do NOT make accusations; describe observations objectively
- Base reasoning strictly on the provided data and reference context
- Be concise, structured, and explainable

Output format MUST be:

SITUATION:
<what triggered the alert>

CUSTOMER PROFILE ANALYSIS:
<relevant facts about the customer and their expected activity>

TRANSACTION ANALYSIS:
<analysis of the observed transaction activity>

RED FLAGS IDENTIFIED:
- <one red flag per bullet>

ASSESSMENT:
<analysis of transactions and risk indicators>

RECOMMENDATION:
<why this activity merits SAR consideration>
";

/// Which section structure the system prompt mandates.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromptVariant {
    /// SITUATION / ASSESSMENT / RECOMMENDATION.
    #[default]
    Standard,
    /// Standard plus customer profile, transaction analysis, and a
    /// red-flag bullet list.
    Extended,
}

impl PromptVariant {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Standard => SYSTEM_PROMPT_STANDARD,
            Self::Extended => SYSTEM_PROMPT_EXTENDED,
        }
    }

    /// Section headers a narrative must contain to be accepted.
    pub fn required_sections(&self) -> &'static [&'static str] {
        match self {
            Self::Standard => &["SITUATION:", "ASSESSMENT:", "RECOMMENDATION:"],
            Self::Extended => &[
                "SITUATION:",
                "CUSTOMER PROFILE ANALYSIS:",
                "TRANSACTION ANALYSIS:",
                "RED FLAGS IDENTIFIED:",
                "ASSESSMENT:",
                "RECOMMENDATION:",
            ],
        }
    }
}

/// Build the human turn: serialized profile, transaction summary, alert
/// reason, and the reference context when any was retrieved.
pub fn build_user_prompt(input: &SarInput, retrieved_context: &str) -> String {
    let profile = serde_json::to_string_pretty(&input.customer_profile)
        .expect("Profile serialization should not fail");
    let transactions = serde_json::to_string_pretty(&input.transaction_summary)
        .expect("Transaction summary serialization should not fail");

    let mut prompt = format!(
        "Customer Profile:\n{profile}\n\nTransaction Summary:\n{transactions}\n\nAlert Reason:\n{}",
        input.alert_reason
    );

    if !retrieved_context.is_empty() {
        prompt.push_str("\n\nReference Context:\n");
        prompt.push_str(retrieved_context);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use casetrail_core::{CustomerProfile, TransactionSummary};

    fn input() -> SarInput {
        SarInput {
            customer_profile: CustomerProfile {
                customer_id: "CUST-001".to_string(),
                customer_name: "John Doe".to_string(),
                risk_score: 65.0,
                declared_income: None,
                occupation: None,
            },
            transaction_summary: TransactionSummary {
                summary: "Multiple high-value transfers within 7 days".to_string(),
                total_amount: None,
                transaction_count: None,
                window_days: Some(7),
            },
            alert_reason: "Unusual spike in cross-border transactions".to_string(),
        }
    }

    #[test]
    fn user_prompt_carries_all_input_signals() {
        let prompt = build_user_prompt(&input(), "");
        assert!(prompt.contains("CUST-001"));
        assert!(prompt.contains("John Doe"));
        assert!(prompt.contains("Multiple high-value transfers"));
        assert!(prompt.contains("Unusual spike in cross-border transactions"));
        assert!(!prompt.contains("Reference Context:"));
    }

    #[test]
    fn context_appended_only_when_present() {
        let prompt = build_user_prompt(&input(), "[SOURCE: FATF]\nStructuring guidance.");
        assert!(prompt.contains("Reference Context:"));
        assert!(prompt.contains("[SOURCE: FATF]"));
    }

    #[test]
    fn standard_sections() {
        assert_eq!(
            PromptVariant::Standard.required_sections(),
            &["SITUATION:", "ASSESSMENT:", "RECOMMENDATION:"]
        );
    }

    #[test]
    fn extended_mandates_red_flags_bullet_list() {
        let sections = PromptVariant::Extended.required_sections();
        assert!(sections.contains(&"RED FLAGS IDENTIFIED:"));
        assert!(sections.contains(&"CUSTOMER PROFILE ANALYSIS:"));
        assert!(sections.contains(&"TRANSACTION ANALYSIS:"));
        assert!(PromptVariant::Extended
            .system_prompt()
            .contains("- <one red flag per bullet>"));
    }

    #[test]
    fn system_prompts_mandate_their_sections() {
        for variant in [PromptVariant::Standard, PromptVariant::Extended] {
            for section in variant.required_sections() {
                assert!(
                    variant.system_prompt().contains(section),
                    "{variant:?} prompt missing {section}"
                );
            }
        }
    }
}
