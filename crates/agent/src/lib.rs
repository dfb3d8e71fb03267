//! Conversation orchestration for the campaign assistant.
//!
//! This crate drives the turn loop:
//! 1. **Prompting** (`prompts`) - system instructions + recent transcript +
//!    collected-field snapshot around the latest utterance
//! 2. **Intent classification** (`classifier`) - parse the LLM's JSON reply
//!    into an action + extracted fields, with a recoverable fallback when the
//!    reply is malformed
//! 3. **Dispatch** (`conversation`) - merge fields, consult the transition
//!    table, and run the music / finalize / submit handlers against the ads
//!    port
//!
//! # Safety principle
//!
//! The LLM is strictly a translator. It never decides whether a campaign is
//! valid or submittable; those are deterministic decisions made by
//! `adpilot-core` and re-checked when the payload is assembled.

pub mod classifier;
pub mod conversation;
pub mod llm;
pub mod prompts;

pub use classifier::ClassifierReply;
pub use conversation::CampaignAgent;
pub use llm::LlmClient;
