//! Speech-to-text capability seam.

use std::sync::Arc;

use async_trait::async_trait;

/// Transcription result with auto-detected language.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub language: Option<String>,
}

/// Transcribes audio bytes to text. Language is auto-detected, never
/// forced.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> anyhow::Result<Transcription>;
}

/// Deferred constructor for a speech backend; invoked at most once, on
/// first use.
pub type SpeechLoader = Arc<dyn Fn() -> anyhow::Result<Arc<dyn SpeechToText>> + Send + Sync>;
