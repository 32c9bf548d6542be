//! The case lifecycle transition table.
//!
//! NEW → UNDER_REVIEW → SAR_DRAFTED, with CLOSED_FALSE_POSITIVE and
//! ESCALATED reachable from any non-terminal state. Terminal states are
//! absorbing. Any transition not in the table is rejected; a case can
//! never hold a status outside the five defined values.

use thiserror::Error;

use crate::types::{CaseAction, CaseStatus};

/// An action was attempted that is not legal for the case's current status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Illegal transition: {action:?} not permitted from {from}")]
pub struct InvalidTransition {
    pub from: CaseStatus,
    pub action: CaseAction,
}

impl CaseStatus {
    /// Apply an analyst action to this status, returning the target status
    /// or [`InvalidTransition`] if the table does not permit it.
    ///
    /// Pure: callers own the atomicity of storing the result.
    pub fn apply(self, action: CaseAction) -> Result<CaseStatus, InvalidTransition> {
        use CaseAction::*;
        use CaseStatus::*;

        let next = match (self, action) {
            (New, BeginReview) => UnderReview,
            (New | UnderReview, GenerateSar) => SarDrafted,
            (New | UnderReview | SarDrafted, MarkFalsePositive) => ClosedFalsePositive,
            (New | UnderReview | SarDrafted, Escalate) => Escalated,
            (from, action) => return Err(InvalidTransition { from, action }),
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CaseAction::*;
    use CaseStatus::*;

    const ALL_STATUSES: [CaseStatus; 5] =
        [New, UnderReview, SarDrafted, ClosedFalsePositive, Escalated];
    const ALL_ACTIONS: [CaseAction; 4] = [BeginReview, GenerateSar, MarkFalsePositive, Escalate];

    #[test]
    fn begin_review_only_from_new() {
        assert_eq!(New.apply(BeginReview), Ok(UnderReview));
        for from in [UnderReview, SarDrafted, ClosedFalsePositive, Escalated] {
            assert!(from.apply(BeginReview).is_err());
        }
    }

    #[test]
    fn generate_sar_from_new_or_under_review() {
        assert_eq!(New.apply(GenerateSar), Ok(SarDrafted));
        assert_eq!(UnderReview.apply(GenerateSar), Ok(SarDrafted));
        assert!(SarDrafted.apply(GenerateSar).is_err());
    }

    #[test]
    fn close_and_escalate_from_any_non_terminal() {
        for from in [New, UnderReview, SarDrafted] {
            assert_eq!(from.apply(MarkFalsePositive), Ok(ClosedFalsePositive));
            assert_eq!(from.apply(Escalate), Ok(Escalated));
        }
    }

    #[test]
    fn terminal_states_absorb_everything() {
        for from in [ClosedFalsePositive, Escalated] {
            for action in ALL_ACTIONS {
                let err = from.apply(action).unwrap_err();
                assert_eq!(err.from, from);
                assert_eq!(err.action, action);
            }
        }
    }

    #[test]
    fn every_transition_lands_in_a_defined_status() {
        // Exhaustive: whatever the table allows, the target is one of the
        // five defined statuses and errors leave the source untouched.
        for from in ALL_STATUSES {
            for action in ALL_ACTIONS {
                match from.apply(action) {
                    Ok(to) => assert!(ALL_STATUSES.contains(&to)),
                    Err(e) => assert_eq!(e.from, from),
                }
            }
        }
    }
}
