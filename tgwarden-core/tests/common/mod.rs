//! Shared mock Telegram client for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use tgwarden_core::router::EventRouter;
use tgwarden_core::{ClientHandle, HistoryQuery, ParseMode, Peer, TelegramClient};

/// Scriptable in-memory client: canned responses in, recorded calls out.
#[derive(Default)]
pub struct MockClient {
    pub user_response: Mutex<Option<Value>>,
    pub message_response: Mutex<Option<Value>>,
    pub download_response: Mutex<Option<Vec<u8>>>,
    pub delete_result: Mutex<bool>,

    pub sent: Mutex<Vec<(Peer, String, Option<ParseMode>)>>,
    pub deleted: Mutex<Vec<(i64, i64)>>,
    pub get_user_calls: AtomicUsize,
    pub get_message_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            delete_result: Mutex::new(true),
            ..Self::default()
        }
    }

    pub fn with_user(user: Value) -> Self {
        let client = Self::new();
        *client.user_response.lock().unwrap() = Some(user);
        client
    }

    pub fn handle(self) -> ClientHandle {
        ClientHandle::new(Arc::new(self))
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

    async fn send_message(
        &self,
        peer: &Peer,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Option<Value> {
        self.sent
            .lock()
            .unwrap()
            .push((peer.clone(), text.to_string(), parse_mode));
        Some(serde_json::json!({"@type": "message", "id": 1}))
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64, _revoke: bool) -> bool {
        self.deleted.lock().unwrap().push((chat_id, message_id));
        *self.delete_result.lock().unwrap()
    }

    async fn get_me(&self) -> Option<Value> {
        None
    }

    async fn get_user(&self, _peer: &Peer) -> Option<Value> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        self.user_response.lock().unwrap().clone()
    }

    async fn get_chat(&self, _peer: &Peer) -> Option<Value> {
        None
    }

    async fn get_message(&self, _chat_id: i64, _message_id: i64) -> Option<Value> {
        self.get_message_calls.fetch_add(1, Ordering::SeqCst);
        self.message_response.lock().unwrap().clone()
    }

    async fn get_history(&self, _peer: &Peer, _query: HistoryQuery) -> Option<Vec<Value>> {
        None
    }

    async fn download_file(&self, _file_id: i64) -> Option<Vec<u8>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.download_response.lock().unwrap().clone()
    }

    async fn listen(self: Arc<Self>, _router: Arc<EventRouter>) {}
}
