//! Per-conversation campaign state: the single source of truth for what has
//! been collected so far, where the conversation stands, and the transcript
//! fed back into the classifier prompt.

use serde::{Deserialize, Serialize};

use crate::domain::campaign::{MusicPlan, Objective};

/// How many transcript entries the classifier prompt sees.
pub const PROMPT_HISTORY_WINDOW: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    #[default]
    Greeting,
    CollectingName,
    CollectingObjective,
    CollectingAdText,
    CollectingCta,
    HandlingMusic,
    ValidatingMusic,
    Finalizing,
    Submitting,
    Complete,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Snapshot of the collected fields, used to build the classifier prompt and
/// to merge classifier output back in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FieldSnapshot {
    pub campaign_name: Option<String>,
    pub objective: Option<String>,
    pub ad_text: Option<String>,
    pub cta: Option<String>,
    pub music_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CampaignState {
    pub stage: ConversationStage,
    pub conversation_history: Vec<ChatTurn>,

    pub campaign_name: Option<String>,
    pub objective: Option<Objective>,
    pub ad_text: Option<String>,
    pub cta: Option<String>,

    pub music_plan: MusicPlan,
    pub music_id: Option<String>,

    pub validation_errors: Vec<String>,
    pub last_api_error: Option<String>,
}

impl CampaignState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale reset, used by the `restart` command. A fresh state also
    /// starts after a completed submission when the user begins a new
    /// campaign.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn record_user(&mut self, content: impl Into<String>) {
        self.conversation_history.push(ChatTurn { role: ChatRole::User, content: content.into() });
    }

    pub fn record_assistant(&mut self, content: impl Into<String>) {
        self.conversation_history
            .push(ChatTurn { role: ChatRole::Assistant, content: content.into() });
    }

    pub fn recent_history(&self) -> &[ChatTurn] {
        let len = self.conversation_history.len();
        &self.conversation_history[len.saturating_sub(PROMPT_HISTORY_WINDOW)..]
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            campaign_name: self.campaign_name.clone(),
            objective: self.objective.map(|o| o.as_str().to_string()),
            ad_text: self.ad_text.clone(),
            cta: self.cta.clone(),
            music_id: self.music_id.clone(),
        }
    }

    /// Merge extracted fields. A later contradicting value silently
    /// overwrites; there is no conflict detection.
    pub fn merge(&mut self, fields: &FieldSnapshot) {
        if let Some(name) = fields.campaign_name.as_deref().filter(|v| !v.trim().is_empty()) {
            self.campaign_name = Some(name.to_string());
        }
        if let Some(objective) =
            fields.objective.as_deref().and_then(crate::domain::campaign::Objective::parse)
        {
            self.objective = Some(objective);
        }
        if let Some(text) = fields.ad_text.as_deref().filter(|v| !v.trim().is_empty()) {
            self.ad_text = Some(text.to_string());
        }
        if let Some(cta) = fields.cta.as_deref().filter(|v| !v.trim().is_empty()) {
            self.cta = Some(cta.to_string());
        }
        if let Some(music_id) = fields.music_id.as_deref().filter(|v| !v.trim().is_empty()) {
            self.music_id = Some(music_id.to_string());
            self.music_plan = MusicPlan::ExistingId(music_id.to_string());
        }
    }

    /// True when every required field is present and the music requirement
    /// for the current objective is satisfied. Field-level format rules are
    /// the validators' concern.
    pub fn is_ready_for_submission(&self) -> bool {
        let required_present = self.campaign_name.is_some()
            && self.objective.is_some()
            && self.ad_text.is_some()
            && self.cta.is_some();
        if !required_present {
            return false;
        }
        match self.objective {
            Some(objective) if objective.music_required() => self.music_id.is_some(),
            _ => true,
        }
    }
}
