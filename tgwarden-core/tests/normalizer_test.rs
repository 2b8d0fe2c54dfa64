//! Integration tests for [`tgwarden_core::normalizer`].
//!
//! Covers: new-message normalization (text, media, flags), the chat-type
//! heuristic, caption/text unification, edit re-fetch, user-status and
//! chat-action events, degraded sender fallback, and soft failure for
//! unrecognized updates.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::{json, Value};
use tgwarden_core::normalizer::normalize;
use tgwarden_core::{ChatType, ClientHandle, Event};

use common::MockClient;

fn user_json() -> Value {
    json!({
        "@type": "user",
        "id": 111,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "phone_number": "+100200300",
        "usernames": {"editable_username": "ada"}
    })
}

fn text_message(chat_id: i64, text: &str) -> Value {
    json!({
        "@type": "updateNewMessage",
        "message": {
            "id": 42,
            "chat_id": chat_id,
            "date": 1700000000,
            "is_outgoing": false,
            "sender_id": {"@type": "messageSenderUser", "user_id": 111},
            "content": {"@type": "messageText", "text": {"@type": "formattedText", "text": text}}
        }
    })
}

/// **Test: plain text message becomes a MessageEvent with enriched sender.**
#[tokio::test]
async fn test_normalize_text_message() {
    let client = MockClient::with_user(user_json()).handle();
    let event = normalize(&text_message(111, "hello"), &client).await.unwrap();

    let msg = event.as_message().expect("message event");
    assert_eq!(msg.message_id, 42);
    assert_eq!(msg.chat_id, 111);
    assert_eq!(msg.sender_id, 111);
    assert_eq!(msg.text, "hello");
    assert_eq!(msg.raw_text, "hello");
    assert_eq!(msg.chat_type, ChatType::Private);
    assert!(!msg.is_outgoing);
    assert!(!msg.is_service);
    assert!(!msg.has_media);
    assert!(msg.media.is_none());
    assert_eq!(msg.sender.username, "ada");
    assert_eq!(msg.sender.full_name(), "Ada Lovelace");
    assert_eq!(msg.sender.phone, "+100200300");
}

/// **Test: chat type is derived from chat id sign/shape.**
#[tokio::test]
async fn test_normalize_chat_type_heuristic() {
    let client = MockClient::with_user(user_json()).handle();

    for (chat_id, expected) in [
        (9000, ChatType::Private),
        (-1001234567, ChatType::Supergroup),
        (-4321, ChatType::Group),
    ] {
        let event = normalize(&text_message(chat_id, "x"), &client).await.unwrap();
        assert_eq!(event.as_message().unwrap().chat_type, expected, "chat_id {chat_id}");
    }
}

/// **Test: failed sender lookup yields a degraded sender, not a dropped event.**
#[tokio::test]
async fn test_normalize_degraded_sender() {
    let client = MockClient::new().handle(); // get_user returns None
    let event = normalize(&text_message(111, "hi"), &client).await.unwrap();

    let msg = event.as_message().unwrap();
    assert_eq!(msg.sender.user_id, 111);
    assert_eq!(msg.sender.first_name, "User111");
    assert!(msg.sender.username.is_empty());
}

/// **Test: photo message picks the largest size variant by area and uses the
/// caption as text; `has_media == media.is_some()`.**
#[tokio::test]
async fn test_normalize_photo_message() {
    let update = json!({
        "@type": "updateNewMessage",
        "message": {
            "id": 7,
            "chat_id": -555,
            "date": 1700000001,
            "sender_id": {"user_id": 111},
            "content": {
                "@type": "messagePhoto",
                "caption": {"text": "look at this"},
                "photo": {"sizes": [
                    {"width": 90, "height": 90, "photo": {"id": 1, "size": 100}},
                    {"width": 800, "height": 600, "photo": {"id": 2, "size": 5000}},
                    {"width": 320, "height": 240, "photo": {"id": 3, "size": 900}}
                ]}
            }
        }
    });

    let client = MockClient::with_user(user_json()).handle();
    let event = normalize(&update, &client).await.unwrap();
    let msg = event.as_message().unwrap();

    assert_eq!(msg.text, "look at this");
    assert!(msg.has_media);
    let media = msg.media.as_ref().unwrap();
    assert_eq!(msg.has_media, msg.media.is_some());
    assert_eq!(media.media_type, "photo");
    assert_eq!(media.width, Some(800));
    assert_eq!(media.height, Some(600));
    assert_eq!(media.file_id, Some(2));
    assert_eq!(media.file_size, Some(5000));
    assert_eq!(media.caption.as_deref(), Some("look at this"));
}

/// **Test: voice note pulls duration/file fields and defaults the mime type.**
#[tokio::test]
async fn test_normalize_voice_note() {
    let update = json!({
        "@type": "updateNewMessage",
        "message": {
            "id": 8,
            "chat_id": -555,
            "date": 1700000002,
            "sender_id": {"user_id": 111},
            "content": {
                "@type": "messageVoiceNote",
                "voice_note": {"duration": 14, "voice": {"id": 77, "size": 4096}}
            }
        }
    });

    let client = MockClient::with_user(user_json()).handle();
    let event = normalize(&update, &client).await.unwrap();
    let media = event.as_message().unwrap().media.clone().unwrap();

    assert_eq!(media.media_type, "voicenote");
    assert_eq!(media.duration, Some(14));
    assert_eq!(media.file_id, Some(77));
    assert_eq!(media.mime_type.as_deref(), Some("audio/ogg"));
}

/// **Test: unknown media content type still yields MediaInfo with only the
/// caption populated.**
#[tokio::test]
async fn test_normalize_unknown_media() {
    let update = json!({
        "@type": "updateNewMessage",
        "message": {
            "id": 9,
            "chat_id": -555,
            "date": 1700000003,
            "sender_id": {"user_id": 111},
            "content": {"@type": "messagePoll", "caption": {"text": "vote!"}}
        }
    });

    let client = MockClient::with_user(user_json()).handle();
    let event = normalize(&update, &client).await.unwrap();
    let msg = event.as_message().unwrap();

    let media = msg.media.as_ref().unwrap();
    assert_eq!(media.media_type, "poll");
    assert_eq!(media.caption.as_deref(), Some("vote!"));
    assert!(media.file_id.is_none());
    assert!(media.duration.is_none());
}

/// **Test: service message content sets is_service.**
#[tokio::test]
async fn test_normalize_service_message() {
    let update = json!({
        "@type": "updateNewMessage",
        "message": {
            "id": 10,
            "chat_id": -555,
            "date": 1700000004,
            "sender_id": {"user_id": 111},
            "content": {"@type": "messageServiceChatAddMembers"}
        }
    });

    let client = MockClient::with_user(user_json()).handle();
    let event = normalize(&update, &client).await.unwrap();
    assert!(event.as_message().unwrap().is_service);
}

/// **Test: edited message triggers a full re-fetch; fetch failure drops the
/// event.**
#[tokio::test]
async fn test_normalize_edited_message_refetch() {
    let edit_update = json!({
        "@type": "updateMessageEdited",
        "chat_id": 111,
        "message_id": 42
    });

    // With the re-fetch answered, the event is built from the full message.
    let client = MockClient::with_user(user_json());
    *client.message_response.lock().unwrap() = Some(json!({
        "id": 42,
        "chat_id": 111,
        "date": 1700000000,
        "edit_date": 1700000100,
        "sender_id": {"user_id": 111},
        "content": {"@type": "messageText", "text": {"text": "edited text"}}
    }));
    let handle = client.handle();

    let event = normalize(&edit_update, &handle).await.unwrap();
    let msg = event.as_message().unwrap();
    assert_eq!(msg.text, "edited text");
    assert!(msg.edit_date.is_some());

    // Without it, the event is dropped after one fetch attempt.
    let failing = Arc::new(MockClient::with_user(user_json()));
    let handle = ClientHandle::new(failing.clone());
    assert!(normalize(&edit_update, &handle).await.is_none());
    assert_eq!(failing.get_message_calls.load(Ordering::SeqCst), 1);
}

/// **Test: user status updates map the online discriminator; anything else
/// is offline.**
#[tokio::test]
async fn test_normalize_user_status() {
    let client = MockClient::new().handle();

    let online = json!({
        "@type": "updateUserStatus",
        "user_id": 5,
        "status": {"@type": "userStatusOnline"}
    });
    match normalize(&online, &client).await.unwrap() {
        Event::UserStatus(e) => {
            assert_eq!(e.user_id, 5);
            assert!(e.is_online);
        }
        other => panic!("expected user status event, got {}", other.kind()),
    }

    let offline = json!({
        "@type": "updateUserStatus",
        "user_id": 5,
        "status": {"@type": "userStatusLastWeek"}
    });
    match normalize(&offline, &client).await.unwrap() {
        Event::UserStatus(e) => assert!(!e.is_online),
        other => panic!("expected user status event, got {}", other.kind()),
    }
}

/// **Test: chat action copies the action discriminator, defaulting to
/// "unknown".**
#[tokio::test]
async fn test_normalize_chat_action() {
    let client = MockClient::new().handle();

    let typing = json!({
        "@type": "updateChatAction",
        "chat_id": -555,
        "sender_id": {"user_id": 5},
        "action": {"@type": "chatActionTyping"}
    });
    match normalize(&typing, &client).await.unwrap() {
        Event::ChatAction(e) => {
            assert_eq!(e.chat_id, -555);
            assert_eq!(e.user_id, 5);
            assert_eq!(e.action, "chatActionTyping");
        }
        other => panic!("expected chat action event, got {}", other.kind()),
    }

    let bare = json!({"@type": "updateChatAction", "chat_id": -555});
    match normalize(&bare, &client).await.unwrap() {
        Event::ChatAction(e) => {
            assert_eq!(e.user_id, 0);
            assert_eq!(e.action, "unknown");
        }
        other => panic!("expected chat action event, got {}", other.kind()),
    }
}

/// **Test: unrecognized or malformed updates normalize to None.**
#[tokio::test]
async fn test_normalize_unrecognized_updates() {
    let client = MockClient::new().handle();

    assert!(normalize(&json!({"@type": "updateOption"}), &client).await.is_none());
    assert!(normalize(&json!({"no_type": true}), &client).await.is_none());
    assert!(normalize(&json!({"@type": "updateNewMessage"}), &client).await.is_none());
    assert!(normalize(&json!("just a string"), &client).await.is_none());
}
