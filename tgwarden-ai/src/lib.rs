//! # tgwarden-ai
//!
//! AI services for the bot: the [`ChatAgent`] (prompt + RAG + bounded
//! per-user history), the [`ModerationService`] content dispatcher, and the
//! capability traits their backends implement ([`ChatModel`],
//! [`ModerationModel`], [`SpeechToText`]).

pub mod agent;
pub mod chat_model;
pub mod language;
pub mod moderation;
pub mod speech;

pub use agent::ChatAgent;
pub use chat_model::{ChatModel, ChatResponse, ChatRole, ChatTurn};
pub use language::{apology_for, detect_language};
pub use moderation::{ModerationModel, ModerationResult, ModerationService};
pub use speech::{SpeechLoader, SpeechToText, Transcription};
