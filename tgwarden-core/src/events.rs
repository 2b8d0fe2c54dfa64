//! Normalized event types: message, user-status and chat-action events plus
//! their substructures (sender, media).
//!
//! Events are produced by the normalizer, owned by the router for one
//! dispatch pass, and handed to handlers by reference. The raw update is
//! carried along for debugging only; application logic must not branch on it
//! outside the normalizer.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::client::ClientHandle;

/// Chat category, derived from the sign/shape of the chat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
    Unknown,
}

impl ChatType {
    /// Derives the chat type from a chat id using the backend's id-encoding
    /// convention: positive ids are private chats, ids of the form
    /// `-100xxxxxxxxx` are supergroups/channels, other negative ids are
    /// basic groups.
    pub fn from_chat_id(chat_id: i64) -> Self {
        if chat_id > 0 {
            ChatType::Private
        } else if chat_id.to_string().starts_with("-100") {
            ChatType::Supergroup
        } else if chat_id < 0 {
            ChatType::Group
        } else {
            ChatType::Unknown
        }
    }
}

/// Information about the sender of a message. Everything besides `user_id`
/// is best-effort; a failed lookup still yields a usable value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderInfo {
    pub user_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl SenderInfo {
    /// Degraded sender used when the user lookup fails: id plus a
    /// synthesized first name.
    pub fn degraded(user_id: i64) -> Self {
        Self {
            user_id,
            first_name: format!("User{user_id}"),
            ..Self::default()
        }
    }

    /// First and last name joined, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Mention string: `@username` when available, otherwise the full name,
    /// otherwise the numeric id.
    pub fn mention(&self) -> String {
        if !self.username.is_empty() {
            return format!("@{}", self.username);
        }
        let full = self.full_name();
        if !full.is_empty() {
            full
        } else {
            self.user_id.to_string()
        }
    }
}

/// Media attached to a message. Only fields meaningful for the given
/// `media_type` are populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    /// Tag such as `photo`, `video`, `voicenote`, `audio`, `document`,
    /// `sticker`, `animation` or `unknown`.
    pub media_type: String,
    pub file_id: Option<i64>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub duration: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub caption: Option<String>,
}

/// Normalized message event from any Telegram client.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub message_id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub sender: SenderInfo,

    /// Plain message text. For media messages this is the caption.
    pub text: String,
    /// Text with markup. Currently identical to `text`.
    pub raw_text: String,

    pub date: DateTime<Utc>,
    pub edit_date: Option<DateTime<Utc>>,

    pub chat_type: ChatType,

    pub is_outgoing: bool,
    pub is_mention: bool,
    pub is_service: bool,

    /// Invariant: `has_media == media.is_some()`.
    pub has_media: bool,
    pub media: Option<MediaInfo>,

    pub reply_to_message_id: Option<i64>,
    pub forward_from_chat_id: Option<i64>,

    /// Originating client, for dispatching replies. Non-owning association.
    pub client: ClientHandle,
    /// Original raw update, kept for debugging only.
    pub raw: Value,
}

/// User online/offline status change. No handler consumes these yet; kept in
/// the event union for forward compatibility.
#[derive(Debug, Clone)]
pub struct UserStatusEvent {
    pub user_id: i64,
    pub is_online: bool,
    pub client: ClientHandle,
    pub raw: Value,
}

/// User is typing, recording voice, etc.
#[derive(Debug, Clone)]
pub struct ChatActionEvent {
    pub chat_id: i64,
    pub user_id: i64,
    pub action: String,
    pub client: ClientHandle,
    pub raw: Value,
}

/// Closed union of all normalized events.
#[derive(Debug, Clone)]
pub enum Event {
    Message(MessageEvent),
    UserStatus(UserStatusEvent),
    ChatAction(ChatActionEvent),
}

impl Event {
    /// Short tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Message(_) => "message",
            Event::UserStatus(_) => "user_status",
            Event::ChatAction(_) => "chat_action",
        }
    }

    /// Returns the inner message event, if this is one.
    pub fn as_message(&self) -> Option<&MessageEvent> {
        match self {
            Event::Message(m) => Some(m),
            _ => None,
        }
    }
}
