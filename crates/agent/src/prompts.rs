//! Prompt templates for the intent classifier.

use std::fmt::Write as _;

use adpilot_core::{CampaignState, ChatRole, Objective};

pub const SYSTEM_PROMPT: &str = r#"You are a professional TikTok Ads campaign assistant. Help the user create an ad campaign through natural, friendly conversation.

CORE RESPONSIBILITIES:
1. Collect campaign information step by step
2. Validate each input against the business rules immediately
3. Give clear, helpful feedback on any errors
4. Guide users through API failures with actionable next steps
5. Enforce every business rule BEFORE attempting submission

BUSINESS RULES YOU MUST ENFORCE:
- Campaign name: minimum 3 characters, required
- Objective: exactly "Traffic" or "Conversions" (case-sensitive)
- Ad text: maximum 100 characters, required
- CTA: required, any text
- Music rules (VERY IMPORTANT):
  * "Traffic" campaigns: music is OPTIONAL
  * "Conversions" campaigns: music is REQUIRED
  * Music ids must be validated via the API before finalizing
  * If music validation fails, explain why and offer alternatives

CONVERSATION STYLE:
- Warm and professional; ask ONE question at a time
- If input is invalid, explain why and ask again
- Never proceed while a business rule is violated
- Never show raw error codes to the user

OUTPUT FORMAT:
Always respond with a single valid JSON object, exactly this structure:
{
  "message": "your conversational reply to the user",
  "action": "one of: collect_name, collect_objective, collect_text, collect_cta, handle_music, validate_music, finalize, submit, complete, error",
  "data": {
    "campaign_name": "value or null",
    "objective": "value or null",
    "ad_text": "value or null",
    "cta": "value or null",
    "music_id": "value or null"
  },
  "validation_errors": ["any validation errors"],
  "next_step": "what to do or collect next"
}

Respond with ONLY the JSON object. No text before or after it, no markdown code blocks."#;

/// Builds the per-turn prompt: recent transcript, collected-field snapshot,
/// what is still needed, and the latest utterance.
pub fn build_user_prompt(state: &CampaignState, user_message: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("CONVERSATION HISTORY:\n");
    let recent = state.recent_history();
    if recent.is_empty() {
        prompt.push_str("(starting a new conversation)\n");
    } else {
        for turn in recent {
            let speaker = match turn.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
                ChatRole::System => "System",
            };
            let _ = writeln!(prompt, "{speaker}: {}", turn.content);
        }
    }

    prompt.push_str("\nCurrent collected data:\n");
    let snapshot = state.snapshot();
    for (field, value) in [
        ("campaign_name", snapshot.campaign_name.as_deref()),
        ("objective", snapshot.objective.as_deref()),
        ("ad_text", snapshot.ad_text.as_deref()),
        ("cta", snapshot.cta.as_deref()),
        ("music_id", snapshot.music_id.as_deref()),
    ] {
        match value {
            Some(value) => {
                let _ = writeln!(prompt, "  [x] {field}: {value}");
            }
            None => {
                let _ = writeln!(prompt, "  [ ] {field}: (not collected yet)");
            }
        }
    }

    let needed = still_needed(state);
    if needed.is_empty() {
        prompt.push_str("\nAll required fields collected!\n");
    } else {
        let _ = writeln!(prompt, "\nStill needed: {}", needed.join(", "));
    }

    let _ = write!(
        prompt,
        "\nUSER'S LATEST MESSAGE:\n\"{user_message}\"\n\n\
         TASK:\nDecide how to respond, whether to validate their input, what to ask for next, \
         and whether the campaign is ready to finalize and submit. Follow the business rules \
         strictly and respond ONLY with the JSON structure from your system instructions.\n"
    );

    prompt
}

fn still_needed(state: &CampaignState) -> Vec<&'static str> {
    let mut needed = Vec::new();
    if state.campaign_name.is_none() {
        needed.push("campaign name");
    }
    if state.objective.is_none() {
        needed.push("objective");
    }
    if state.ad_text.is_none() {
        needed.push("ad text");
    }
    if state.cta.is_none() {
        needed.push("CTA");
    }
    if state.music_id.is_none() {
        match state.objective {
            Some(Objective::Conversions) => needed.push("music (REQUIRED for Conversions)"),
            Some(Objective::Traffic) => needed.push("music (optional for Traffic)"),
            None => {}
        }
    }
    needed
}

#[cfg(test)]
mod tests {
    use adpilot_core::{CampaignState, Objective};

    use super::{build_user_prompt, SYSTEM_PROMPT};

    #[test]
    fn system_prompt_pins_the_json_contract() {
        for action in ["collect_name", "validate_music", "finalize", "submit", "error"] {
            assert!(SYSTEM_PROMPT.contains(action), "missing action {action}");
        }
        assert!(SYSTEM_PROMPT.contains("\"validation_errors\""));
    }

    #[test]
    fn fresh_conversation_is_labelled() {
        let state = CampaignState::new();
        let prompt = build_user_prompt(&state, "hello");
        assert!(prompt.contains("(starting a new conversation)"));
        assert!(prompt.contains("\"hello\""));
    }

    #[test]
    fn music_need_depends_on_objective() {
        let mut state = CampaignState::new();
        state.objective = Some(Objective::Conversions);
        let prompt = build_user_prompt(&state, "ok");
        assert!(prompt.contains("music (REQUIRED for Conversions)"));

        state.objective = Some(Objective::Traffic);
        let prompt = build_user_prompt(&state, "ok");
        assert!(prompt.contains("music (optional for Traffic)"));

        state.music_id = Some("MUS_12345".to_string());
        let prompt = build_user_prompt(&state, "ok");
        assert!(!prompt.contains("music (optional"));
    }

    #[test]
    fn history_window_is_respected() {
        let mut state = CampaignState::new();
        for i in 0..10 {
            state.record_user(format!("turn {i}"));
        }
        let prompt = build_user_prompt(&state, "latest");
        assert!(!prompt.contains("turn 3"));
        assert!(prompt.contains("turn 4"));
        assert!(prompt.contains("turn 9"));
    }

    #[test]
    fn collected_fields_are_marked() {
        let mut state = CampaignState::new();
        state.campaign_name = Some("Summer Sale".to_string());
        let prompt = build_user_prompt(&state, "next");
        assert!(prompt.contains("[x] campaign_name: Summer Sale"));
        assert!(prompt.contains("[ ] objective"));
        assert!(prompt.contains("Still needed: objective, ad text, CTA"));
    }
}
