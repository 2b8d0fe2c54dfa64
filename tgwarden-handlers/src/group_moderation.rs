//! Group moderation handler: screens group messages and removes violations.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use tgwarden_ai::moderation::{ModerationResult, ModerationService};
use tgwarden_core::{ChatType, Event, EventHandler, HandlerError, MessageEvent, ParseMode, Peer};

/// Runs every eligible group message through the moderation service and
/// deletes flagged ones. Audit logs and user-facing warnings are sent only
/// after the deletion actually succeeded, so they never reference a message
/// that is still visible.
pub struct GroupModerationHandler {
    service: Arc<ModerationService>,
    /// When set, only groups whose absolute chat id is listed are screened.
    monitored_groups: Option<HashSet<i64>>,
    /// Audit channel for deletion records. `None` disables logging.
    send_logs_to: Option<Peer>,
    /// Whether to post a warning back into the chat after a deletion.
    send_warnings: bool,
}

impl GroupModerationHandler {
    pub fn new(
        service: Arc<ModerationService>,
        monitored_groups: Option<HashSet<i64>>,
        send_logs_to: Option<Peer>,
        send_warnings: bool,
    ) -> Self {
        info!(
            monitored_groups = monitored_groups.as_ref().map(HashSet::len),
            audit_log = send_logs_to.is_some(),
            send_warnings,
            "group moderation handler initialized"
        );
        Self {
            service,
            monitored_groups,
            send_logs_to,
            send_warnings,
        }
    }

    fn deletion_log_text(event: &MessageEvent, result: &ModerationResult) -> String {
        let media_type = event
            .media
            .as_ref()
            .map(|m| m.media_type.as_str())
            .unwrap_or("text");
        format!(
            "🗑 <b>Message deleted</b>\n\n\
             🧾 <b>Message ID:</b> <code>{}</code>\n\
             💬 <b>Chat ID:</b> <code>{}</code>\n\
             👤 <b>User:</b> {} ({})\n\
             🆔 <b>User ID:</b> <code>{}</code>\n\
             📞 <b>Phone:</b> {}\n\
             📝 <b>Content:</b> «{}»\n\
             🖼 <b>Media:</b> {}\n\
             ⚠️ <b>Reason:</b> {}\n\
             📊 <b>Confidence:</b> {:.2}\n",
            event.message_id,
            event.chat_id,
            event.sender.full_name(),
            event.sender.mention(),
            event.sender_id,
            event.sender.phone,
            event.text,
            media_type,
            result.reason,
            result.confidence,
        )
    }

    fn warning_text(event: &MessageEvent, result: &ModerationResult) -> String {
        format!(
            "❗️ {}\n Your message in this chat was removed due to violation of community guidelines.\n\n\
             Reason: {}\n\
             Please adhere to the rules to avoid further actions.",
            event.sender.mention(),
            result.reason,
        )
    }

    async fn report_deletion(&self, event: &MessageEvent, result: &ModerationResult) {
        if let Some(peer) = &self.send_logs_to {
            let text = Self::deletion_log_text(event, result);
            if event
                .client
                .send_message(peer, &text, Some(ParseMode::Html))
                .await
                .is_none()
            {
                error!(%peer, "failed to send moderation log");
            }
        }

        if self.send_warnings {
            let text = Self::warning_text(event, result);
            if event
                .client
                .send_message(&Peer::Id(event.chat_id), &text, Some(ParseMode::Html))
                .await
                .is_none()
            {
                error!(chat_id = event.chat_id, "failed to send moderation warning");
            }
        }
    }
}

#[async_trait]
impl EventHandler for GroupModerationHandler {
    fn name(&self) -> &'static str {
        "group_moderation"
    }

    fn can_handle(&self, event: &Event) -> bool {
        let Some(msg) = event.as_message() else {
            return false;
        };
        debug!(
            chat_type = ?msg.chat_type,
            is_outgoing = msg.is_outgoing,
            "group moderation eligibility check"
        );

        // Basic groups only; supergroups have their own admin tooling.
        if msg.chat_type != ChatType::Group {
            return false;
        }
        // Skipped only when both flags are set.
        if msg.is_outgoing && msg.is_service {
            return false;
        }
        if let Some(groups) = &self.monitored_groups {
            if !groups.contains(&msg.chat_id.abs()) {
                return false;
            }
        }
        true
    }

    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let Some(msg) = event.as_message() else {
            return Ok(());
        };

        info!(
            message_id = msg.message_id,
            chat_id = msg.chat_id,
            "moderating message"
        );

        let result = self.service.moderate_message(msg).await;

        if !result.should_delete {
            debug!(message_id = msg.message_id, "message passed moderation");
            return Ok(());
        }

        warn!(
            message_id = msg.message_id,
            reason = %result.reason,
            "deleting message"
        );

        if !msg
            .client
            .delete_message(msg.chat_id, msg.message_id, true)
            .await
        {
            return Err(HandlerError::DeleteFailed {
                chat_id: msg.chat_id,
                message_id: msg.message_id,
            });
        }

        info!(message_id = msg.message_id, "message deleted");
        self.report_deletion(msg, &result).await;
        Ok(())
    }
}
