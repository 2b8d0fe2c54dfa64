//! Whisper transcription backend.

use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, info};

use tgwarden_ai::language::detect_language;
use tgwarden_ai::speech::{SpeechToText, Transcription};

const DEFAULT_MODEL: &str = "whisper-1";

/// Speech-to-text over the OpenAI audio transcription API.
pub struct WhisperSpeech {
    client: Client<OpenAIConfig>,
    model: String,
}

impl WhisperSpeech {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self::with_model(client, DEFAULT_MODEL)
    }

    pub fn with_model(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        let model = model.into();
        info!(model = %model, "whisper speech backend initialized");
        Self { client, model }
    }
}

#[async_trait]
impl SpeechToText for WhisperSpeech {
    async fn transcribe(&self, audio: &[u8]) -> anyhow::Result<Transcription> {
        let request = CreateTranscriptionRequestArgs::default()
            // Telegram voice notes are ogg/opus; the filename carries the format.
            .file(AudioInput::from_vec_u8("voice.ogg".to_string(), audio.to_vec()))
            .model(&self.model)
            .build()?;

        let response = self.client.audio().transcribe(request).await?;
        debug!(len = response.text.len(), "voice note transcribed");

        let language = detect_language(&response.text);
        Ok(Transcription {
            text: response.text,
            language,
        })
    }
}
