//! Telegram client capability trait.
//!
//! The core consumes clients only through [`TelegramClient`]; concrete
//! transports (TDLib, future Telethon-style clients) live in their own
//! crates. Getters fail soft with `Option` — a missing user or chat is an
//! expected condition, not an error.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::router::EventRouter;

/// Human-facing chat or user identifier: a username-like string or a
/// numeric id. Resolution to a backend chat id is the client's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peer {
    Username(String),
    Id(i64),
}

impl Peer {
    /// Parses a string into a peer: numeric forms (optionally negative)
    /// become ids, anything else is treated as a username with a leading
    /// `@` stripped.
    pub fn parse(s: &str) -> Self {
        if let Ok(id) = s.trim_start_matches('-').parse::<i64>() {
            if s.starts_with('-') {
                return Peer::Id(-id);
            }
            return Peer::Id(id);
        }
        Peer::Username(s.trim_start_matches('@').to_string())
    }
}

impl From<i64> for Peer {
    fn from(id: i64) -> Self {
        Peer::Id(id)
    }
}

impl From<&str> for Peer {
    fn from(s: &str) -> Self {
        Peer::parse(s)
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::Username(name) => write!(f, "@{name}"),
            Peer::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Outbound text formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
    Html,
}

/// Options for a history fetch.
#[derive(Debug, Clone, Copy)]
pub struct HistoryQuery {
    pub limit: i64,
    pub from_message_id: i64,
    pub offset: i64,
    pub only_local: bool,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            from_message_id: 0,
            offset: 0,
            only_local: false,
        }
    }
}

/// Abstraction over a connected Telegram account.
///
/// All message/chat payloads are raw backend JSON; the normalizer is the
/// only place that interprets them.
#[async_trait]
pub trait TelegramClient: Send + Sync {
    /// Display name of this client (account), used in logs and the manager.
    fn name(&self) -> &str;

    /// Starts the client. Returns false on failure.
    async fn start(&self) -> bool;

    /// Stops the client. Returns false on failure.
    async fn stop(&self) -> bool;

    /// Sends a text message. Returns the sent message object, or `None`.
    async fn send_message(
        &self,
        peer: &Peer,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Option<Value>;

    /// Deletes a message. `revoke` deletes for all participants.
    async fn delete_message(&self, chat_id: i64, message_id: i64, revoke: bool) -> bool;

    /// Information about the authenticated account.
    async fn get_me(&self) -> Option<Value>;

    /// Looks up a user by peer.
    async fn get_user(&self, peer: &Peer) -> Option<Value>;

    /// Looks up a chat by peer.
    async fn get_chat(&self, peer: &Peer) -> Option<Value>;

    /// Fetches one full message. Used by the normalizer to materialize
    /// edit notifications, which arrive as deltas.
    async fn get_message(&self, chat_id: i64, message_id: i64) -> Option<Value>;

    /// Fetches message history for a chat.
    async fn get_history(&self, peer: &Peer, query: HistoryQuery) -> Option<Vec<Value>>;

    /// Downloads a file's bytes. `None` on any failure.
    async fn download_file(&self, file_id: i64) -> Option<Vec<u8>>;

    /// Consumes the client's raw update stream, routing each update through
    /// the given router. Updates from one client are processed sequentially.
    async fn listen(self: Arc<Self>, router: Arc<EventRouter>);
}

/// Cloneable non-owning handle to the originating client, carried inside
/// events so handlers can reply through the connection the event came from.
#[derive(Clone)]
pub struct ClientHandle(Arc<dyn TelegramClient>);

impl ClientHandle {
    pub fn new(client: Arc<dyn TelegramClient>) -> Self {
        Self(client)
    }
}

impl Deref for ClientHandle {
    type Target = dyn TelegramClient;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClientHandle").field(&self.0.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_parse_numeric() {
        assert_eq!(Peer::parse("123"), Peer::Id(123));
        assert_eq!(Peer::parse("-100123"), Peer::Id(-100123));
    }

    #[test]
    fn test_peer_parse_username() {
        assert_eq!(Peer::parse("@ada"), Peer::Username("ada".into()));
        assert_eq!(Peer::parse("ada"), Peer::Username("ada".into()));
    }

    #[test]
    fn test_peer_display() {
        assert_eq!(Peer::Username("ada".into()).to_string(), "@ada");
        assert_eq!(Peer::Id(-42).to_string(), "-42");
    }
}
