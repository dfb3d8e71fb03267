//! The intent classifier reply contract and its tolerant parser.
//!
//! The LLM must answer with a single JSON object: `message`, `action`,
//! `data`, `validation_errors`, `next_step`. Models occasionally wrap the
//! object in markdown code fences, so those are stripped before parsing.
//! Anything else that fails to parse is a recoverable classifier failure:
//! the caller gets an `error`/`retry` reply and the conversation state stays
//! untouched.

use serde::Deserialize;

use adpilot_core::{AgentAction, FieldSnapshot};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ClassifierReply {
    #[serde(default)]
    pub message: String,
    pub action: AgentAction,
    #[serde(default)]
    pub data: FieldSnapshot,
    #[serde(default)]
    pub validation_errors: Vec<String>,
    #[serde(default)]
    pub next_step: String,
}

impl ClassifierReply {
    /// Reply used when the classifier output could not be understood.
    pub fn parse_failure() -> Self {
        Self {
            message: "I had trouble processing that. Could you please rephrase?".to_string(),
            action: AgentAction::Error,
            data: FieldSnapshot::default(),
            validation_errors: vec!["classifier reply was not valid JSON".to_string()],
            next_step: "retry".to_string(),
        }
    }
}

pub fn parse_reply(raw: &str) -> ClassifierReply {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str::<ClassifierReply>(cleaned) {
        Ok(reply) => reply,
        Err(error) => {
            tracing::warn!(%error, "classifier reply failed to parse");
            ClassifierReply::parse_failure()
        }
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

#[cfg(test)]
mod tests {
    use adpilot_core::AgentAction;

    use super::{parse_reply, ClassifierReply};

    const WELL_FORMED: &str = r#"{
        "message": "Great name! What's your objective?",
        "action": "collect_objective",
        "data": {"campaign_name": "Summer Sale"},
        "validation_errors": [],
        "next_step": "ask for objective"
    }"#;

    #[test]
    fn parses_well_formed_reply() {
        let reply = parse_reply(WELL_FORMED);
        assert_eq!(reply.action, AgentAction::CollectObjective);
        assert_eq!(reply.data.campaign_name.as_deref(), Some("Summer Sale"));
        assert_eq!(reply.next_step, "ask for objective");
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = format!("```json\n{WELL_FORMED}\n```");
        let reply = parse_reply(&fenced);
        assert_eq!(reply.action, AgentAction::CollectObjective);

        let bare_fence = format!("```\n{WELL_FORMED}\n```");
        assert_eq!(parse_reply(&bare_fence).action, AgentAction::CollectObjective);
    }

    #[test]
    fn missing_optional_fields_default() {
        let reply = parse_reply(r#"{"action": "finalize"}"#);
        assert_eq!(reply.action, AgentAction::Finalize);
        assert!(reply.message.is_empty());
        assert!(reply.validation_errors.is_empty());
        assert_eq!(reply.data, adpilot_core::FieldSnapshot::default());
    }

    #[test]
    fn prose_reply_becomes_recoverable_failure() {
        let reply = parse_reply("Sure, I'd be happy to help with your campaign!");
        assert_eq!(reply, ClassifierReply::parse_failure());
        assert_eq!(reply.action, AgentAction::Error);
        assert_eq!(reply.next_step, "retry");
    }

    #[test]
    fn unknown_action_becomes_recoverable_failure() {
        let reply = parse_reply(r#"{"action": "launch_rockets"}"#);
        assert_eq!(reply.action, AgentAction::Error);
    }

    #[test]
    fn truncated_json_becomes_recoverable_failure() {
        let reply = parse_reply(r#"{"message": "hi", "action": "collect_na"#);
        assert_eq!(reply.action, AgentAction::Error);
    }
}
