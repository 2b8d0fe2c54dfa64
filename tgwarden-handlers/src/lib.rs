//! Event handlers wired onto the [`tgwarden_core::EventRouter`].
//!
//! Each handler owns one feature: [`PmReplyHandler`] answers private
//! messages through the chat agent, [`GroupModerationHandler`] screens
//! group messages and removes violations.

pub mod group_moderation;
pub mod pm_reply;

pub use group_moderation::GroupModerationHandler;
pub use pm_reply::PmReplyHandler;
