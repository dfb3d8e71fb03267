use serde::{Deserialize, Serialize};

use crate::state::ConversationStage;

/// The ten actions the intent classifier may emit. The wire names are part
/// of the classifier JSON contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentAction {
    CollectName,
    CollectObjective,
    CollectText,
    CollectCta,
    HandleMusic,
    ValidateMusic,
    Finalize,
    Submit,
    Complete,
    Error,
}

impl AgentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectName => "collect_name",
            Self::CollectObjective => "collect_objective",
            Self::CollectText => "collect_text",
            Self::CollectCta => "collect_cta",
            Self::HandleMusic => "handle_music",
            Self::ValidateMusic => "validate_music",
            Self::Finalize => "finalize",
            Self::Submit => "submit",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: ConversationStage,
    pub to: ConversationStage,
    pub action: AgentAction,
}
