//! The conversation orchestrator.
//!
//! One `CampaignAgent` owns one conversation: its state, its LLM client,
//! and its ads-port session. A turn flows classifier -> field merge ->
//! transition table -> handler. Handlers commit the proposed stage only on
//! success, so a failed finalize or submission leaves the conversation where
//! it was. Every API failure is translated into guidance; nothing from the
//! port or the classifier propagates as a raw error.

use adpilot_core::flows::{transition, AgentAction, TransitionOutcome};
use adpilot_core::{
    validate_complete_campaign, CampaignPayload, CampaignState, ConversationStage, MusicPlan,
};
use adpilot_api::port::AdsApi;

use crate::classifier::{self, ClassifierReply};
use crate::llm::LlmClient;
use crate::prompts;

pub struct CampaignAgent<L, A> {
    llm: L,
    api: A,
    state: CampaignState,
}

impl<L, A> CampaignAgent<L, A>
where
    L: LlmClient,
    A: AdsApi,
{
    pub fn new(llm: L, api: A) -> Self {
        Self { llm, api, state: CampaignState::new() }
    }

    pub fn state(&self) -> &CampaignState {
        &self.state
    }

    /// Wholesale restart: fresh state, same collaborators.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn greeting(&self) -> String {
        "Welcome to the TikTok ad campaign creator!\n\n\
         I'll help you build a campaign step by step. We'll collect:\n\
         - Campaign name\n\
         - Campaign objective (Traffic or Conversions)\n\
         - Ad text (max 100 characters)\n\
         - Call-to-action (CTA)\n\
         - Music (required for Conversions, optional for Traffic)\n\n\
         What would you like to name your campaign?"
            .to_string()
    }

    /// Runs one conversation turn to completion.
    pub async fn process_message(&mut self, user_message: &str) -> String {
        self.state.record_user(user_message);

        let prompt = format!(
            "{}\n\nUser task:\n{}",
            prompts::SYSTEM_PROMPT,
            prompts::build_user_prompt(&self.state, user_message)
        );
        let reply = match self.llm.complete(&prompt).await {
            Ok(text) => classifier::parse_reply(&text),
            Err(error) => {
                tracing::warn!(%error, "llm call failed");
                ClassifierReply::parse_failure()
            }
        };

        tracing::debug!(action = reply.action.as_str(), stage = ?self.state.stage, "classified turn");

        // Transient diagnostics are overwritten every turn.
        self.state.validation_errors = reply.validation_errors.clone();

        let message = match transition(&self.state.stage, &reply.action) {
            Ok(outcome) => {
                // A classifier failure must leave collected fields
                // untouched; a rejected action never merges at all.
                if reply.action != AgentAction::Error {
                    self.state.merge(&reply.data);
                }
                self.dispatch(outcome, &reply).await
            }
            Err(error) => {
                tracing::warn!(%error, "transition rejected");
                self.rejected_transition_message(reply.action)
            }
        };

        self.state.record_assistant(&message);
        message
    }

    async fn dispatch(&mut self, outcome: TransitionOutcome, reply: &ClassifierReply) -> String {
        match outcome.action {
            AgentAction::ValidateMusic => self.handle_music_validation(outcome.to).await,
            AgentAction::Finalize => self.handle_finalization(outcome.to),
            AgentAction::Submit => self.handle_submission(outcome.to).await,
            AgentAction::Error => {
                if reply.message.is_empty() {
                    ClassifierReply::parse_failure().message
                } else {
                    reply.message.clone()
                }
            }
            _ => {
                self.state.stage = outcome.to;
                if reply.message.is_empty() {
                    "Got it. What would you like to do next?".to_string()
                } else {
                    reply.message.clone()
                }
            }
        }
    }

    fn rejected_transition_message(&self, action: AgentAction) -> String {
        if self.state.stage == ConversationStage::Complete {
            return "This campaign is already complete. Type \"restart\" to begin a new one."
                .to_string();
        }
        match action {
            AgentAction::Submit => "Let's review the campaign before submitting. Say \
                                    \"finalize\" when you're ready and I'll show you a summary."
                .to_string(),
            _ => "That step isn't available right now. Let's keep going with the campaign \
                  details."
                .to_string(),
        }
    }

    /// Case A: an existing music id is confirmed against the ads backend.
    async fn handle_music_validation(&mut self, to: ConversationStage) -> String {
        let Some(music_id) = self.state.music_id.clone() else {
            return "I don't have a music id to validate yet. Share one, upload a file with \
                    \"upload <file>\", or tell me you'd like no music."
                .to_string();
        };

        match self.api.validate_music(&music_id).await {
            Ok(metadata) => {
                self.state.stage = to;
                self.state.music_plan = MusicPlan::ExistingId(metadata.music_id.clone());
                self.state.music_id = Some(metadata.music_id.clone());
                self.state.last_api_error = None;
                format!(
                    "Music validated successfully!\n\n\
                     \"{}\" by {}\n  Duration: {} seconds\n  Status: {}\n\n\
                     Great choice! Ready to proceed with campaign creation?",
                    metadata.title, metadata.artist, metadata.duration_secs, metadata.status
                )
            }
            Err(error) => {
                self.state.last_api_error = Some(error.explain());
                let options = error
                    .music_recovery_options(self.state.objective)
                    .into_iter()
                    .enumerate()
                    .map(|(i, option)| format!("  {}. {option}", i + 1))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{}\n\nWhat would you like to do?\n{options}", error.explain())
            }
        }
    }

    /// Case B: a custom file is uploaded and the minted id attached. Exposed
    /// directly because uploads arrive as a dedicated command, not free text.
    pub async fn handle_music_upload(&mut self, file_name: &str) -> String {
        self.state.record_user(format!("upload {file_name}"));

        let message = match self.api.upload_music(file_name).await {
            Ok(receipt) => {
                self.state.music_plan = MusicPlan::CustomUpload(receipt.file_name.clone());
                self.state.music_id = Some(receipt.music_id.clone());
                self.state.last_api_error = None;
                if self.state.stage != ConversationStage::Finalizing {
                    self.state.stage = ConversationStage::HandlingMusic;
                }
                format!(
                    "Music uploaded successfully!\n\n  File: {}\n  Music id: {}\n  Status: {}\n\n\
                     {}\n\nYour music will be ready shortly. Ready to proceed?",
                    receipt.file_name, receipt.music_id, receipt.status, receipt.message
                )
            }
            Err(error) => {
                self.state.last_api_error = Some(error.explain());
                format!(
                    "{}\n\nWould you like to try a different file, or use an existing music id \
                     instead?",
                    error.explain()
                )
            }
        };

        self.state.record_assistant(&message);
        message
    }

    /// Full validation pass and review summary. The stage advances only when
    /// every rule passes; otherwise the complete correction list is returned
    /// and the user must resupply.
    fn handle_finalization(&mut self, to: ConversationStage) -> String {
        let snapshot = self.state.snapshot();
        let validation = validate_complete_campaign(
            snapshot.campaign_name.as_deref().unwrap_or(""),
            snapshot.objective.as_deref().unwrap_or(""),
            snapshot.ad_text.as_deref().unwrap_or(""),
            snapshot.cta.as_deref().unwrap_or(""),
            snapshot.music_id.as_deref(),
        );

        if !validation.is_valid {
            self.state.validation_errors = validation.errors.clone();
            return format!(
                "Cannot proceed yet - some details are missing or invalid:\n\n{}\n\n\
                 Please provide the corrected information.",
                validation.error_lines()
            );
        }

        self.state.validation_errors.clear();
        // Case C: finalizing a valid campaign with no id means the user
        // chose to go without music (only reachable with a Traffic
        // objective).
        if self.state.music_id.is_none() {
            self.state.music_plan = MusicPlan::NoMusic;
        }
        self.state.stage = to;

        let music_status =
            self.state.music_id.clone().unwrap_or_else(|| "No music".to_string());
        format!(
            "Campaign summary\n\n\
               Campaign name: {}\n  Objective: {}\n  Ad text: \"{}\"\n  CTA: {}\n  Music: {}\n\n\
             Everything look good? Reply \"submit\" to create the campaign, or tell me what \
             you'd like to change.",
            snapshot.campaign_name.unwrap_or_default(),
            snapshot.objective.unwrap_or_default(),
            snapshot.ad_text.unwrap_or_default(),
            snapshot.cta.unwrap_or_default(),
            music_status
        )
    }

    /// Rebuilds the strict payload (which re-validates independently) and
    /// submits it. Success completes the conversation; failure returns to
    /// the review stage with translated guidance.
    async fn handle_submission(&mut self, to: ConversationStage) -> String {
        let payload = match CampaignPayload::assemble(
            self.state.campaign_name.as_deref(),
            self.state.objective,
            self.state.ad_text.as_deref(),
            self.state.cta.as_deref(),
            self.state.music_id.as_deref(),
        ) {
            Ok(payload) => payload,
            Err(validation) => {
                // The state drifted since finalize passed; fail loudly and
                // stay in review.
                self.state.validation_errors = validation.errors.clone();
                return format!(
                    "The campaign can't be submitted as it stands:\n\n{}\n\n\
                     Let's fix those first.",
                    validation.error_lines()
                );
            }
        };

        self.state.stage = to;
        match self.api.create_campaign(&payload).await {
            Ok(receipt) => {
                self.state.stage = ConversationStage::Complete;
                self.state.last_api_error = None;
                format!(
                    "Campaign created!\n\n\
                       Campaign id: {}\n  Name: {}\n  Status: {}\n\n\
                     Dashboard: {}\n\n{}\n\n\
                     Type \"restart\" to create another campaign.",
                    receipt.campaign_id,
                    receipt.campaign_name,
                    receipt.status,
                    receipt.dashboard_url,
                    receipt.message
                )
            }
            Err(error) => {
                self.state.stage = ConversationStage::Finalizing;
                self.state.last_api_error = Some(error.explain());
                format!(
                    "Campaign creation failed.\n\n{}\n\n\
                     Say \"submit\" to try again, or tell me what to change.",
                    error.explain()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use anyhow::Result;
    use async_trait::async_trait;

    use adpilot_api::MockAdsApi;
    use adpilot_core::{ConversationStage, MusicPlan, Objective};

    use super::CampaignAgent;
    use crate::llm::LlmClient;

    /// Replays canned classifier replies in order.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<String>) -> Self {
            Self { replies: Mutex::new(replies.into()) }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self
                .replies
                .lock()
                .expect("scripted replies lock")
                .pop_front()
                .unwrap_or_else(|| r#"{"action": "error", "message": "script exhausted"}"#.into()))
        }
    }

    fn reply(action: &str, data: &str) -> String {
        format!(r#"{{"message": "ok", "action": "{action}", "data": {data}}}"#)
    }

    #[tokio::test]
    async fn malformed_classifier_reply_leaves_state_untouched() {
        let llm = ScriptedLlm::new(vec![
            reply("collect_name", r#"{"campaign_name": "Summer Sale"}"#),
            "Sure! Let me help you with that.".to_string(),
        ]);
        let mut agent = CampaignAgent::new(llm, MockAdsApi::new());

        agent.process_message("call it Summer Sale").await;
        let before = agent.state().clone();

        let answer = agent.process_message("and make it pop").await;
        assert!(answer.contains("rephrase"));
        assert_eq!(agent.state().campaign_name, before.campaign_name);
        assert_eq!(agent.state().stage, before.stage);
    }

    #[tokio::test]
    async fn submit_before_finalize_is_structurally_rejected() {
        let llm = ScriptedLlm::new(vec![reply("submit", "{}")]);
        let mut agent = CampaignAgent::new(llm, MockAdsApi::new());

        let answer = agent.process_message("just submit it").await;
        assert!(answer.contains("finalize"));
        assert_eq!(agent.state().stage, ConversationStage::Greeting);
    }

    #[tokio::test]
    async fn finalize_with_missing_fields_reports_all_errors_and_stays() {
        let llm = ScriptedLlm::new(vec![reply(
            "finalize",
            r#"{"campaign_name": "Hi", "objective": "Conversions"}"#,
        )]);
        let mut agent = CampaignAgent::new(llm, MockAdsApi::new());

        let answer = agent.process_message("we're done, review it").await;
        assert!(answer.contains("Cannot proceed"));
        assert_ne!(agent.state().stage, ConversationStage::Finalizing);
        // name too short + ad text + cta + music requirement.
        assert!(agent.state().validation_errors.len() >= 4);
    }

    #[tokio::test]
    async fn conversions_without_music_cannot_finalize() {
        let llm = ScriptedLlm::new(vec![reply(
            "finalize",
            r#"{"campaign_name": "Summer Sale", "objective": "Conversions",
                "ad_text": "Get 50% off!", "cta": "Shop Now"}"#,
        )]);
        let mut agent = CampaignAgent::new(llm, MockAdsApi::new());

        let answer = agent.process_message("review please").await;
        assert!(answer.contains("REQUIRED"));
        assert_ne!(agent.state().stage, ConversationStage::Finalizing);
    }

    #[tokio::test]
    async fn music_validation_failure_offers_recovery_options() {
        let llm = ScriptedLlm::new(vec![reply(
            "validate_music",
            r#"{"objective": "Traffic", "music_id": "MUS_00000"}"#,
        )]);
        let mut agent = CampaignAgent::new(llm, MockAdsApi::new());

        let answer = agent.process_message("use MUS_00000").await;
        assert!(!answer.contains("invalid_music_id"), "raw code leaked: {answer}");
        assert!(answer.contains("doesn't exist"));
        assert!(answer.contains("1."));
        // Traffic objective: proceeding without music is on the menu.
        assert!(answer.contains("without music"));
        assert_ne!(agent.state().stage, ConversationStage::ValidatingMusic);
    }

    #[tokio::test]
    async fn music_validation_success_records_plan() {
        let llm = ScriptedLlm::new(vec![reply("validate_music", r#"{"music_id": "MUS_12345"}"#)]);
        let mut agent = CampaignAgent::new(llm, MockAdsApi::new());

        let answer = agent.process_message("use MUS_12345").await;
        assert!(answer.contains("Trending Beat 2024"));
        assert_eq!(agent.state().stage, ConversationStage::ValidatingMusic);
        assert_eq!(agent.state().music_plan, MusicPlan::ExistingId("MUS_12345".to_string()));
    }

    #[tokio::test]
    async fn upload_attaches_minted_music_id() {
        let llm = ScriptedLlm::new(Vec::new());
        let mut agent = CampaignAgent::new(llm, MockAdsApi::new());

        let answer = agent.handle_music_upload("brand_anthem.mp3").await;
        assert!(answer.contains("Music uploaded successfully"));
        let id = agent.state().music_id.clone().expect("minted id attached");
        assert!(id.starts_with("MUS_CUSTOM_"));
        assert_eq!(
            agent.state().music_plan,
            MusicPlan::CustomUpload("brand_anthem.mp3".to_string())
        );
    }

    #[tokio::test]
    async fn finalize_without_music_on_traffic_selects_no_music() {
        let llm = ScriptedLlm::new(vec![reply(
            "finalize",
            r#"{"campaign_name": "Summer Sale", "objective": "Traffic",
                "ad_text": "Get 50% off!", "cta": "Shop Now"}"#,
        )]);
        let mut agent = CampaignAgent::new(llm, MockAdsApi::new());

        let answer = agent.process_message("that's everything").await;
        assert!(answer.contains("Campaign summary"));
        assert!(answer.contains("No music"));
        assert_eq!(agent.state().stage, ConversationStage::Finalizing);
        assert_eq!(agent.state().music_plan, MusicPlan::NoMusic);
        assert_eq!(agent.state().objective, Some(Objective::Traffic));
    }

    #[tokio::test]
    async fn reset_returns_to_fresh_state() {
        let llm = ScriptedLlm::new(vec![reply(
            "collect_name",
            r#"{"campaign_name": "Summer Sale"}"#,
        )]);
        let mut agent = CampaignAgent::new(llm, MockAdsApi::new());
        agent.process_message("Summer Sale").await;
        assert!(agent.state().campaign_name.is_some());

        agent.reset();
        assert!(agent.state().campaign_name.is_none());
        assert_eq!(agent.state().stage, ConversationStage::Greeting);
    }
}
