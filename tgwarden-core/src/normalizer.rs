//! Event normalization: raw backend updates into typed [`Event`]s.
//!
//! The raw stream is loosely typed JSON discriminated by `@type`. This
//! module is the only place allowed to interpret those payloads. It fails
//! soft: any shape it does not recognize yields `None` and the update is
//! dropped; it never errors.

use chrono::DateTime;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ClientHandle;
use crate::events::{
    ChatActionEvent, ChatType, Event, MediaInfo, MessageEvent, SenderInfo, UserStatusEvent,
};

/// Content `@type` of a plain text message.
const CONTENT_TEXT: &str = "messageText";
/// Prefix shared by all service-message content types.
const SERVICE_PREFIX: &str = "messageService";

/// Converts a raw update into a normalized event, or `None` for any
/// unsupported or malformed shape.
pub async fn normalize(update: &Value, client: &ClientHandle) -> Option<Event> {
    let update_type = update.get("@type")?.as_str()?;

    match update_type {
        "updateNewMessage" => {
            debug!("processing new message update");
            let message = update.get("message")?;
            message_event(message, client, update).await.map(Event::Message)
        }
        "updateMessageEdited" => {
            // The edit notification is a delta; re-fetch the full message.
            let chat_id = update.get("chat_id")?.as_i64()?;
            let message_id = update.get("message_id")?.as_i64()?;
            match client.get_message(chat_id, message_id).await {
                Some(message) => message_event(&message, client, update)
                    .await
                    .map(Event::Message),
                None => {
                    warn!(chat_id, message_id, "could not re-fetch edited message, dropping");
                    None
                }
            }
        }
        "updateUserStatus" => {
            let user_id = update.get("user_id")?.as_i64()?;
            let is_online = update
                .pointer("/status/@type")
                .and_then(Value::as_str)
                .map(|t| t == "userStatusOnline")
                .unwrap_or(false);
            Some(Event::UserStatus(UserStatusEvent {
                user_id,
                is_online,
                client: client.clone(),
                raw: update.clone(),
            }))
        }
        "updateChatAction" => {
            let chat_id = update.get("chat_id")?.as_i64()?;
            let user_id = update
                .pointer("/sender_id/user_id")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            let action = update
                .pointer("/action/@type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            Some(Event::ChatAction(ChatActionEvent {
                chat_id,
                user_id,
                action,
                client: client.clone(),
                raw: update.clone(),
            }))
        }
        _ => None,
    }
}

/// Builds a [`MessageEvent`] from a full backend message object.
async fn message_event(
    message: &Value,
    client: &ClientHandle,
    raw_update: &Value,
) -> Option<MessageEvent> {
    let message_id = message.get("id")?.as_i64()?;
    let chat_id = message.get("chat_id")?.as_i64()?;

    debug!(message_id, chat_id, "converting raw message to MessageEvent");

    let content = message.get("content").cloned().unwrap_or(Value::Null);
    let content_type = content
        .get("@type")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    // Body text and media captions are unified into one field.
    let text = if content_type == CONTENT_TEXT {
        content
            .pointer("/text/text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    } else {
        content
            .pointer("/caption/text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };

    let chat_type = ChatType::from_chat_id(chat_id);

    let sender_id = message
        .pointer("/sender_id/user_id")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let sender = sender_info(sender_id, client).await;

    let has_media = content_type != CONTENT_TEXT;
    let media = if has_media {
        let info = extract_media(&content, &content_type);
        debug!(message_id, media_type = %info.media_type, "message has media");
        Some(info)
    } else {
        None
    };

    let date = message.get("date").and_then(Value::as_i64).unwrap_or(0);
    let edit_date = message
        .get("edit_date")
        .and_then(Value::as_i64)
        .filter(|&ts| ts > 0)
        .and_then(|ts| DateTime::from_timestamp(ts, 0));

    Some(MessageEvent {
        message_id,
        chat_id,
        sender_id,
        sender,
        raw_text: text.clone(),
        text,
        date: DateTime::from_timestamp(date, 0).unwrap_or(DateTime::UNIX_EPOCH),
        edit_date,
        chat_type,
        is_outgoing: message
            .get("is_outgoing")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        is_mention: message
            .get("contains_unread_mention")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        is_service: content_type.starts_with(SERVICE_PREFIX),
        has_media,
        media,
        reply_to_message_id: message.get("reply_to_message_id").and_then(Value::as_i64),
        forward_from_chat_id: message
            .pointer("/forward_info/from_chat_id")
            .and_then(Value::as_i64),
        client: client.clone(),
        raw: raw_update.clone(),
    })
}

/// Per-type media field mapping. Unknown content types still yield a
/// `MediaInfo` with `media_type: "unknown"` and only the caption populated.
fn extract_media(content: &Value, content_type: &str) -> MediaInfo {
    // 'messagePhoto' -> 'photo', 'messageVoiceNote' -> 'voicenote'
    let media_type = if let Some(stripped) = content_type.strip_prefix("message") {
        stripped.to_lowercase()
    } else {
        "unknown".to_string()
    };

    let caption = content
        .pointer("/caption/text")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let mut info = MediaInfo {
        media_type,
        caption,
        ..MediaInfo::default()
    };

    match content_type {
        "messagePhoto" => {
            // Pick the largest size variant by pixel area.
            let largest = content
                .pointer("/photo/sizes")
                .and_then(Value::as_array)
                .and_then(|sizes| {
                    sizes.iter().max_by_key(|s| {
                        let w = s.get("width").and_then(Value::as_i64).unwrap_or(0);
                        let h = s.get("height").and_then(Value::as_i64).unwrap_or(0);
                        w * h
                    })
                });
            if let Some(size) = largest {
                info.width = size.get("width").and_then(Value::as_i64);
                info.height = size.get("height").and_then(Value::as_i64);
                info.file_id = size.pointer("/photo/id").and_then(Value::as_i64);
                info.file_size = size.pointer("/photo/size").and_then(Value::as_i64);
            }
        }
        "messageVideo" => {
            let video = content.get("video").cloned().unwrap_or(Value::Null);
            info.duration = video.get("duration").and_then(Value::as_i64);
            info.width = video.get("width").and_then(Value::as_i64);
            info.height = video.get("height").and_then(Value::as_i64);
            info.file_id = video.pointer("/video/id").and_then(Value::as_i64);
            info.file_size = video.pointer("/video/size").and_then(Value::as_i64);
            info.mime_type = video
                .get("mime_type")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        "messageVoiceNote" => {
            let voice = content.get("voice_note").cloned().unwrap_or(Value::Null);
            info.duration = voice.get("duration").and_then(Value::as_i64);
            info.file_id = voice.pointer("/voice/id").and_then(Value::as_i64);
            info.file_size = voice.pointer("/voice/size").and_then(Value::as_i64);
            info.mime_type = Some(
                voice
                    .get("mime_type")
                    .and_then(Value::as_str)
                    .unwrap_or("audio/ogg")
                    .to_string(),
            );
        }
        "messageAudio" => {
            let audio = content.get("audio").cloned().unwrap_or(Value::Null);
            info.duration = audio.get("duration").and_then(Value::as_i64);
            info.file_id = audio.pointer("/audio/id").and_then(Value::as_i64);
            info.file_size = audio.pointer("/audio/size").and_then(Value::as_i64);
            info.mime_type = audio
                .get("mime_type")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        "messageDocument" => {
            let document = content.get("document").cloned().unwrap_or(Value::Null);
            info.file_id = document.pointer("/document/id").and_then(Value::as_i64);
            info.file_size = document.pointer("/document/size").and_then(Value::as_i64);
            info.mime_type = document
                .get("mime_type")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        "messageSticker" => {
            let sticker = content.get("sticker").cloned().unwrap_or(Value::Null);
            info.width = sticker.get("width").and_then(Value::as_i64);
            info.height = sticker.get("height").and_then(Value::as_i64);
            info.file_id = sticker.pointer("/sticker/id").and_then(Value::as_i64);
        }
        "messageAnimation" => {
            let animation = content.get("animation").cloned().unwrap_or(Value::Null);
            info.duration = animation.get("duration").and_then(Value::as_i64);
            info.width = animation.get("width").and_then(Value::as_i64);
            info.height = animation.get("height").and_then(Value::as_i64);
            info.file_id = animation.pointer("/animation/id").and_then(Value::as_i64);
            info.file_size = animation.pointer("/animation/size").and_then(Value::as_i64);
            info.mime_type = animation
                .get("mime_type")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        _ => {}
    }

    info
}

/// Enriches the sender via the originating client. Lookup failure yields a
/// degraded sender rather than aborting the whole event.
async fn sender_info(sender_id: i64, client: &ClientHandle) -> SenderInfo {
    let user = match client.get_user(&sender_id.into()).await {
        Some(user) => user,
        None => {
            warn!(sender_id, "could not fetch user info, using degraded sender");
            return SenderInfo::degraded(sender_id);
        }
    };

    let username = user
        .pointer("/usernames/editable_username")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    SenderInfo {
        user_id: sender_id,
        username,
        first_name: user
            .get("first_name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        last_name: user
            .get("last_name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        phone: user
            .get("phone_number")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    }
}
