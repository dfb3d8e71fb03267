//! Explicit transition table for the conversation state machine.
//!
//! Transitions are keyed by `(current stage, classifier action)` so illegal
//! moves such as `submit` before a successful finalize are rejected
//! structurally instead of being patched over in handlers. The orchestrator
//! commits the proposed stage only after the dispatched handler succeeds, so
//! a failed finalize leaves the stage where it was.

use thiserror::Error;

use crate::flows::states::{AgentAction, TransitionOutcome};
use crate::state::ConversationStage;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("action {action:?} is not valid while in stage {stage:?}")]
    InvalidTransition { stage: ConversationStage, action: AgentAction },
}

pub fn transition(
    current: &ConversationStage,
    action: &AgentAction,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use AgentAction::{
        CollectCta, CollectName, CollectObjective, CollectText, Complete, Error, Finalize,
        HandleMusic, Submit, ValidateMusic,
    };
    use ConversationStage as Stage;

    let invalid = || {
        Err(FlowTransitionError::InvalidTransition { stage: *current, action: *action })
    };

    // The classifier error action never moves the conversation; the user is
    // asked to rephrase from wherever they were.
    if matches!(action, Error) {
        return Ok(TransitionOutcome { from: *current, to: *current, action: *action });
    }

    let to = match (current, action) {
        // A completed campaign accepts no further actions; a new campaign
        // starts from a fresh state.
        (Stage::Complete, Complete) => Stage::Complete,
        (Stage::Complete, _) => return invalid(),

        // Collection can be entered and re-entered from any pre-submission
        // stage: the classifier drives ordering and values are
        // last-write-wins.
        (Stage::Submitting, CollectName | CollectObjective | CollectText | CollectCta) => {
            return invalid()
        }
        (_, CollectName) => Stage::CollectingName,
        (_, CollectObjective) => Stage::CollectingObjective,
        (_, CollectText) => Stage::CollectingAdText,
        (_, CollectCta) => Stage::CollectingCta,

        (Stage::Submitting, HandleMusic | ValidateMusic) => return invalid(),
        (_, HandleMusic) => Stage::HandlingMusic,
        (_, ValidateMusic) => Stage::ValidatingMusic,

        // Finalize may be attempted from anywhere pre-submission; the
        // aggregator decides whether the stage actually advances.
        (Stage::Submitting, Finalize) => return invalid(),
        (_, Finalize) => Stage::Finalizing,

        // Submit only after a finalize pass succeeded.
        (Stage::Finalizing, Submit) => Stage::Submitting,
        (_, Submit) => return invalid(),

        (Stage::Submitting, Complete) => Stage::Complete,
        (_, Complete) => return invalid(),

        (_, Error) => unreachable!("handled above"),
    };

    Ok(TransitionOutcome { from: *current, to, action: *action })
}
