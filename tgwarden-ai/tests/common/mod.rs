//! Shared mocks and event builders for tgwarden-ai integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;

use tgwarden_ai::moderation::{ModerationModel, ModerationResult};
use tgwarden_ai::speech::{SpeechToText, Transcription};
use tgwarden_core::router::EventRouter;
use tgwarden_core::{
    ChatType, ClientHandle, HistoryQuery, MediaInfo, MessageEvent, ParseMode, Peer, SenderInfo,
    TelegramClient,
};

/// Client mock that only serves file downloads.
#[derive(Default)]
pub struct DownloadClient {
    pub file_bytes: Mutex<Option<Vec<u8>>>,
    pub download_calls: AtomicUsize,
}

impl DownloadClient {
    pub fn serving(bytes: &[u8]) -> Arc<Self> {
        let client = Arc::new(Self::default());
        *client.file_bytes.lock().unwrap() = Some(bytes.to_vec());
        client
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl TelegramClient for DownloadClient {
    fn name(&self) -> &str {
        "download-mock"
    }

    async fn start(&self) -> bool {
        true
    }

    async fn stop(&self) -> bool {
        true
    }

    async fn send_message(&self, _: &Peer, _: &str, _: Option<ParseMode>) -> Option<Value> {
        None
    }

    async fn delete_message(&self, _: i64, _: i64, _: bool) -> bool {
        false
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

    async fn download_file(&self, _file_id: i64) -> Option<Vec<u8>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.file_bytes.lock().unwrap().clone()
    }

    async fn listen(self: Arc<Self>, _router: Arc<EventRouter>) {}
}

/// Builds a message event for moderation tests.
pub fn message_event(
    client: Arc<DownloadClient>,
    text: &str,
    media: Option<MediaInfo>,
) -> MessageEvent {
    MessageEvent {
        message_id: 100,
        chat_id: -555,
        sender_id: 9,
        sender: SenderInfo {
            user_id: 9,
            username: "sender".into(),
            first_name: "Test".into(),
            ..Default::default()
        },
        text: text.to_string(),
        raw_text: text.to_string(),
        date: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        edit_date: None,
        chat_type: ChatType::Group,
        is_outgoing: false,
        is_mention: false,
        is_service: false,
        has_media: media.is_some(),
        media,
        reply_to_message_id: None,
        forward_from_chat_id: None,
        client: ClientHandle::new(client),
        raw: Value::Null,
    }
}

/// Moderation model that records which path was taken.
#[derive(Default)]
pub struct RecordingModerationModel {
    pub text_inputs: Mutex<Vec<String>>,
    pub image_inputs: Mutex<Vec<(usize, Option<String>)>>,
    pub voice_inputs: Mutex<Vec<String>>,
    pub verdict: Mutex<Option<ModerationResult>>,
}

impl RecordingModerationModel {
    pub fn clean() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn flagging(result: ModerationResult) -> Arc<Self> {
        let model = Arc::new(Self::default());
        *model.verdict.lock().unwrap() = Some(result);
        model
    }

    fn result(&self) -> ModerationResult {
        self.verdict
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ModerationResult::neutral("Content is acceptable"))
    }
}

#[async_trait]
impl ModerationModel for RecordingModerationModel {
    async fn moderate_text(&self, text: &str) -> ModerationResult {
        self.text_inputs.lock().unwrap().push(text.to_string());
        self.result()
    }

    async fn moderate_image(&self, image: &[u8], caption: Option<&str>) -> ModerationResult {
        self.image_inputs
            .lock()
            .unwrap()
            .push((image.len(), caption.map(str::to_string)));
        self.result()
    }

    async fn moderate_voice(&self, transcription: &str) -> ModerationResult {
        self.voice_inputs
            .lock()
            .unwrap()
            .push(transcription.to_string());
        self.result()
    }
}

/// Speech backend returning a fixed transcription.
pub struct FixedSpeech {
    pub text: String,
    pub calls: AtomicUsize,
}

#[async_trait]
impl SpeechToText for FixedSpeech {
    async fn transcribe(&self, _audio: &[u8]) -> anyhow::Result<Transcription> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Transcription {
            text: self.text.clone(),
            language: Some("eng".into()),
        })
    }
}
