//! The narrative generator: prompt assembly, timeout-bounded model call,
//! and output-structure validation.

use std::time::{Duration, Instant};

use casetrail_core::SarInput;

use crate::client::{CompletionRequest, NarrativeModel};
use crate::config::ModelConfig;
use crate::error::{GenerationError, Result};
use crate::prompt::{self, PromptVariant};

/// Generates SAR narratives from typed case inputs.
///
/// Side-effect free with respect to persistence; cancellation (dropping
/// the future) before completion leaves no observable state anywhere.
pub struct SarGenerator<M> {
    model: M,
    variant: PromptVariant,
    timeout: Duration,
}

impl<M: NarrativeModel> SarGenerator<M> {
    pub fn new(model: M, variant: PromptVariant, timeout: Duration) -> Self {
        Self {
            model,
            variant,
            timeout,
        }
    }

    /// Build a generator around a backend described by `config`.
    pub fn with_config(model: M, config: &ModelConfig) -> Self {
        Self::new(
            model,
            config.prompt_variant,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// The model identity to record in reasoning traces.
    pub fn model_name(&self) -> String {
        self.model.model_name()
    }

    /// Generate a SAR narrative. An empty `retrieved_context` means "no
    /// grounding available" and is not an error.
    ///
    /// Fails with [`GenerationError`] if the backend is unreachable, the
    /// call exceeds the configured timeout, or the output is empty or
    /// missing a mandated section.
    pub async fn generate(&self, input: &SarInput, retrieved_context: &str) -> Result<String> {
        let request = CompletionRequest {
            system: self.variant.system_prompt().to_string(),
            user: prompt::build_user_prompt(input, retrieved_context),
        };

        let start = Instant::now();
        let narrative = tokio::time::timeout(self.timeout, self.model.complete(&request))
            .await
            .map_err(|_| GenerationError::Timeout {
                seconds: self.timeout.as_secs(),
            })??;

        self.validate(&narrative)?;

        tracing::info!(
            model = %self.model.model_name(),
            customer_id = %input.customer_profile.customer_id,
            grounded = !retrieved_context.is_empty(),
            duration_ms = start.elapsed().as_millis(),
            "Narrative generated"
        );

        Ok(narrative)
    }

    fn validate(&self, narrative: &str) -> Result<()> {
        if narrative.trim().is_empty() {
            return Err(GenerationError::EmptyOutput);
        }
        for section in self.variant.required_sections() {
            if !narrative.contains(section) {
                return Err(GenerationError::MissingSection { section });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casetrail_core::{CustomerProfile, TransactionSummary};

    /// Test stub returning a canned narrative (or never returning).
    struct StubModel {
        output: Option<String>,
    }

    impl NarrativeModel for StubModel {
        fn model_name(&self) -> String {
            "stub".to_string()
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            match &self.output {
                Some(text) => Ok(text.clone()),
                None => std::future::pending().await,
            }
        }
    }

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
                summary: "Multiple high-value transfers".to_string(),
                total_amount: None,
                transaction_count: None,
                window_days: None,
            },
            alert_reason: "Cross-border spike".to_string(),
        }
    }

    const GOOD_NARRATIVE: &str =
        "SITUATION:\nAlert.\n\nASSESSMENT:\nAnalysis.\n\nRECOMMENDATION:\nFile.";

    #[tokio::test]
    async fn accepts_well_structured_output() {
        let gen = SarGenerator::new(
            StubModel {
                output: Some(GOOD_NARRATIVE.to_string()),
            },
            PromptVariant::Standard,
            Duration::from_secs(5),
        );
        let narrative = gen.generate(&input(), "").await.unwrap();
        assert_eq!(narrative, GOOD_NARRATIVE);
    }

    #[tokio::test]
    async fn rejects_missing_section() {
        let gen = SarGenerator::new(
            StubModel {
                output: Some("SITUATION:\nAlert only.".to_string()),
            },
            PromptVariant::Standard,
            Duration::from_secs(5),
        );
        let err = gen.generate(&input(), "").await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::MissingSection {
                section: "ASSESSMENT:"
            }
        ));
    }

    #[tokio::test]
    async fn rejects_empty_output() {
        let gen = SarGenerator::new(
            StubModel {
                output: Some("   \n".to_string()),
            },
            PromptVariant::Standard,
            Duration::from_secs(5),
        );
        assert!(matches!(
            gen.generate(&input(), "").await,
            Err(GenerationError::EmptyOutput)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_model_never_answers() {
        let gen = SarGenerator::new(
            StubModel { output: None },
            PromptVariant::Standard,
            Duration::from_secs(3),
        );
        let err = gen.generate(&input(), "").await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { seconds: 3 }));
    }

    #[tokio::test]
    async fn extended_variant_enforces_red_flags() {
        let gen = SarGenerator::new(
            StubModel {
                output: Some(GOOD_NARRATIVE.to_string()),
            },
            PromptVariant::Extended,
            Duration::from_secs(5),
        );
        let err = gen.generate(&input(), "").await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingSection { .. }));
    }
}
