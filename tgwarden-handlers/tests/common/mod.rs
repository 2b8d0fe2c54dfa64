//! Shared mocks and event builders for handler integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{json, Value};

use tgwarden_ai::chat_model::{ChatModel, ChatResponse, ChatTurn};
use tgwarden_ai::moderation::{ModerationModel, ModerationResult};
use tgwarden_core::router::EventRouter;
use tgwarden_core::{
    ChatType, ClientHandle, Event, HistoryQuery, MediaInfo, MessageEvent, ParseMode, Peer,
    SenderInfo, TelegramClient,
};

/// Client mock recording outbound traffic and deletions.
#[derive(Default)]
pub struct MockClient {
    pub sent: Mutex<Vec<(Peer, String, Option<ParseMode>)>>,
    pub deleted: Mutex<Vec<(i64, i64)>>,
    pub send_fails: AtomicBool,
    pub delete_fails: AtomicBool,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t, _)| t.clone()).collect()
    }
}

#[async_trait]
impl TelegramClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn start(&self) -> bool {
        true
    }

    async fn stop(&self) -> bool {
        true
    }

    async fn send_message(&self, peer: &Peer, text: &str, mode: Option<ParseMode>) -> Option<Value> {
        if self.send_fails.load(Ordering::SeqCst) {
            return None;
        }
        self.sent
            .lock()
            .unwrap()
            .push((peer.clone(), text.to_string(), mode));
        Some(json!({"@type": "message"}))
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64, _revoke: bool) -> bool {
        if self.delete_fails.load(Ordering::SeqCst) {
            return false;
        }
        self.deleted.lock().unwrap().push((chat_id, message_id));
        true
    }

    async fn get_me(&self) -> Option<Value> {
        None
    }

    async fn get_user(&self, _: &Peer) -> Option<Value> {
        None
    }

    async fn get_chat(&self, _: &Peer) -> Option<Value> {
        None
    }

    async fn get_message(&self, _: i64, _: i64) -> Option<Value> {
        None
    }

    async fn get_history(&self, _: &Peer, _: HistoryQuery) -> Option<Vec<Value>> {
        None
    }

    async fn download_file(&self, _: i64) -> Option<Vec<u8>> {
        Some(vec![1, 2, 3])
    }

    async fn listen(self: Arc<Self>, _router: Arc<EventRouter>) {}
}

pub struct EventBuilder {
    event: MessageEvent,
}

impl EventBuilder {
    pub fn new(client: Arc<MockClient>) -> Self {
        Self {
            event: MessageEvent {
                message_id: 42,
                chat_id: 777,
                sender_id: 9,
                sender: SenderInfo {
                    user_id: 9,
                    username: "alice".into(),
                    first_name: "Alice".into(),
                    last_name: "Smith".into(),
                    phone: "+123456".into(),
                },
                text: "hello".into(),
                raw_text: "hello".into(),
                date: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
                edit_date: None,
                chat_type: ChatType::Private,
                is_outgoing: false,
                is_mention: false,
                is_service: false,
                has_media: false,
                media: None,
                reply_to_message_id: None,
                forward_from_chat_id: None,
                client: ClientHandle::new(client),
                raw: Value::Null,
            },
        }
    }

    pub fn chat(mut self, chat_id: i64) -> Self {
        self.event.chat_id = chat_id;
        self.event.chat_type = ChatType::from_chat_id(chat_id);
        self
    }

    pub fn sender_id(mut self, sender_id: i64) -> Self {
        self.event.sender_id = sender_id;
        self.event.sender.user_id = sender_id;
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.event.text = text.to_string();
        self.event.raw_text = text.to_string();
        self
    }

    pub fn outgoing(mut self) -> Self {
        self.event.is_outgoing = true;
        self
    }

    pub fn service(mut self) -> Self {
        self.event.is_service = true;
        self
    }

    pub fn media(mut self, media: MediaInfo) -> Self {
        self.event.has_media = true;
        self.event.media = Some(media);
        self
    }

    pub fn build(self) -> Event {
        Event::Message(self.event)
    }
}

/// Chat model returning a fixed scripted response.
pub struct ScriptedChatModel {
    pub response: Mutex<ChatResponse>,
}

impl ScriptedChatModel {
    pub fn replying(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(ChatResponse::reply(message)),
        })
    }

    pub fn escalating(message: &str, reason: &str, confidence: f32) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(ChatResponse {
                message: message.to_string(),
                should_escalate: true,
                escalation_reason: Some(reason.to_string()),
                confidence,
                language: None,
            }),
        })
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_message: &str,
        _history: &[ChatTurn],
        _rag_context: Option<&str>,
    ) -> ChatResponse {
        self.response.lock().unwrap().clone()
    }
}

/// Moderation model with a fixed verdict.
pub struct FixedModerationModel {
    pub verdict: ModerationResult,
}

impl FixedModerationModel {
    pub fn clean() -> Arc<Self> {
        Arc::new(Self {
            verdict: ModerationResult::neutral("Content is acceptable"),
        })
    }

    pub fn flagging(reason: &str, confidence: f32) -> Arc<Self> {
        Arc::new(Self {
            verdict: ModerationResult::violation(reason, confidence, vec!["harassment".into()]),
        })
    }
}

#[async_trait]
impl ModerationModel for FixedModerationModel {
    async fn moderate_text(&self, _: &str) -> ModerationResult {
        self.verdict.clone()
    }

    async fn moderate_image(&self, _: &[u8], _: Option<&str>) -> ModerationResult {
        self.verdict.clone()
    }

    async fn moderate_voice(&self, _: &str) -> ModerationResult {
        self.verdict.clone()
    }
}
