//! Auto-reply handler for private messages.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use tgwarden_ai::agent::ChatAgent;
use tgwarden_ai::chat_model::ChatResponse;
use tgwarden_core::{ChatType, Event, EventHandler, HandlerError, MessageEvent, Peer};

/// Replies to incoming private messages with agent-generated answers and
/// notifies a human channel when the agent asks for escalation.
pub struct PmReplyHandler {
    agent: Arc<ChatAgent>,
    /// When set, only these sender ids are answered.
    monitored_users: Option<HashSet<i64>>,
    /// Where escalation notifications go. `None` disables them.
    escalation_peer: Option<Peer>,
}

impl PmReplyHandler {
    pub fn new(
        agent: Arc<ChatAgent>,
        monitored_users: Option<HashSet<i64>>,
        escalation_peer: Option<Peer>,
    ) -> Self {
        info!(
            monitored_users = monitored_users.as_ref().map(HashSet::len),
            escalation = escalation_peer.is_some(),
            "pm reply handler initialized"
        );
        Self {
            agent,
            monitored_users,
            escalation_peer,
        }
    }

    fn escalation_text(event: &MessageEvent, response: &ChatResponse) -> String {
        format!(
            "🔔 Escalation Required\n\n\
             User: {} (@{})\n\
             User ID: {}\n\
             Chat ID: {}\n\n\
             Question: {}\n\n\
             Reason: {}\n\
             Confidence: {:.2}\n\n\
             Auto-reply sent: {}",
            event.sender.full_name(),
            event.sender.username,
            event.sender_id,
            event.chat_id,
            event.text,
            response.escalation_reason.as_deref().unwrap_or("unknown"),
            response.confidence,
            response.message,
        )
    }

    async fn notify_escalation(&self, event: &MessageEvent, response: &ChatResponse) {
        let Some(peer) = &self.escalation_peer else {
            return;
        };
        let text = Self::escalation_text(event, response);
        if event.client.send_message(peer, &text, None).await.is_none() {
            // The user still gets their reply; only the notification is lost.
            error!(%peer, "failed to send escalation notification");
        }
    }
}

#[async_trait]
impl EventHandler for PmReplyHandler {
    fn name(&self) -> &'static str {
        "pm_reply"
    }

    fn can_handle(&self, event: &Event) -> bool {
        let Some(msg) = event.as_message() else {
            return false;
        };
        debug!(
            chat_type = ?msg.chat_type,
            is_outgoing = msg.is_outgoing,
            "pm reply eligibility check"
        );

        if msg.chat_type != ChatType::Private {
            return false;
        }
        if msg.is_outgoing || msg.is_service {
            return false;
        }
        if msg.text.trim().is_empty() {
            return false;
        }
        if let Some(users) = &self.monitored_users {
            if !users.contains(&msg.sender_id) {
                return false;
            }
        }
        true
    }

    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let Some(msg) = event.as_message() else {
            return Ok(());
        };

        let preview: String = msg.text.chars().take(50).collect();
        info!(
            sender = %msg.sender.full_name(),
            username = %msg.sender.username,
            preview = %preview,
            "handling private message"
        );

        let response = self
            .agent
            .generate_response(&msg.text, msg.sender_id, false)
            .await;

        if response.should_escalate {
            warn!(
                reason = response.escalation_reason.as_deref().unwrap_or("unknown"),
                confidence = response.confidence,
                "escalation required"
            );
            self.notify_escalation(msg, &response).await;
        }

        let sent = msg
            .client
            .send_message(&Peer::Id(msg.chat_id), response.outgoing_text(), None)
            .await;

        match sent {
            Some(_) => {
                info!(
                    message_id = msg.message_id,
                    escalated = response.should_escalate,
                    "replied to private message"
                );
                Ok(())
            }
            None => Err(HandlerError::SendFailed(msg.chat_id)),
        }
    }
}
