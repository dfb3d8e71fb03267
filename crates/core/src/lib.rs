//! Deterministic core of the adpilot campaign assistant.
//!
//! Everything in this crate is synchronous and side-effect free: domain
//! types, field validators, the music requirement rules, the full-campaign
//! validation aggregator, the conversation transition table, and
//! configuration loading. The LLM and the ads backend live behind traits in
//! the `adpilot-agent` and `adpilot-api` crates; this crate never talks to
//! the network.

pub mod config;
pub mod domain;
pub mod flows;
pub mod state;
pub mod validators;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::campaign::{CampaignPayload, MusicPlan, Objective};
pub use flows::{transition, AgentAction, FlowTransitionError, TransitionOutcome};
pub use state::{CampaignState, ChatRole, ChatTurn, ConversationStage, FieldSnapshot};
pub use validators::{
    validate_ad_text, validate_campaign_name, validate_complete_campaign, validate_cta,
    validate_music_for_objective, validate_objective, CampaignValidation,
};
