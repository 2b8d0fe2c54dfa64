//! Chat model capability trait and its structured response.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One role-tagged turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Structured response from a chat model. Produced fresh per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub should_escalate: bool,
    pub escalation_reason: Option<String>,
    pub confidence: f32,
    /// Detected source language of the user message, when known.
    pub language: Option<String>,
}

impl ChatResponse {
    /// Plain non-escalated reply with full confidence.
    pub fn reply(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            should_escalate: false,
            escalation_reason: None,
            confidence: 1.0,
            language: None,
        }
    }

    /// Text sent back to the chat.
    pub fn outgoing_text(&self) -> &str {
        &self.message
    }
}

/// Chat AI backend.
///
/// Implementations must never fail past this boundary: any internal error
/// maps to a graceful escalating response (translated apology, confidence
/// 0.0, reason `"API error"`).
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
        history: &[ChatTurn],
        rag_context: Option<&str>,
    ) -> ChatResponse;
}
