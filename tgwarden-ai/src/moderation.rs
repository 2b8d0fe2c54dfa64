//! Moderation service: content-type dispatch over a moderation model.
//!
//! Pure routing by message shape; no AI call is made when there is nothing
//! to check. Media is downloaded on demand through the originating client,
//! and voice notes are transcribed by a lazily-initialized speech backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use tgwarden_core::{MediaInfo, MessageEvent};

use crate::speech::{SpeechLoader, SpeechToText};

/// Result of one moderation check. Produced fresh per call, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationResult {
    pub should_delete: bool,
    pub should_warn: bool,
    pub reason: String,
    /// 0.0–1.0. Callers treat low confidence as a signal, not as absence
    /// of a result.
    pub confidence: f32,
    pub violations: Vec<String>,
}

impl ModerationResult {
    /// Non-deleting result with the given reason and zero confidence.
    pub fn neutral(reason: impl Into<String>) -> Self {
        Self {
            should_delete: false,
            should_warn: false,
            reason: reason.into(),
            confidence: 0.0,
            violations: Vec::new(),
        }
    }

    pub fn violation(reason: impl Into<String>, confidence: f32, violations: Vec<String>) -> Self {
        Self {
            should_delete: true,
            should_warn: true,
            reason: reason.into(),
            confidence,
            violations,
        }
    }
}

/// AI moderation backend. Implementations map internal errors to neutral
/// results; these calls never fail.
#[async_trait]
pub trait ModerationModel: Send + Sync {
    async fn moderate_text(&self, text: &str) -> ModerationResult;

    async fn moderate_image(&self, image: &[u8], caption: Option<&str>) -> ModerationResult;

    async fn moderate_voice(&self, transcription: &str) -> ModerationResult;
}

const NO_CONTENT: &str = "No content to moderate";
const DOWNLOAD_FAILED: &str = "Failed to download media";

pub struct ModerationService {
    model: Arc<dyn ModerationModel>,
    speech_loader: Option<SpeechLoader>,
    /// Initialized once, on the first voice message.
    speech: OnceCell<Option<Arc<dyn SpeechToText>>>,
}

impl ModerationService {
    pub fn new(model: Arc<dyn ModerationModel>) -> Self {
        info!("moderation service initialized");
        Self {
            model,
            speech_loader: None,
            speech: OnceCell::new(),
        }
    }

    /// Enables voice moderation with a deferred speech backend.
    pub fn with_speech_loader(model: Arc<dyn ModerationModel>, loader: SpeechLoader) -> Self {
        info!("moderation service initialized with speech backend");
        Self {
            model,
            speech_loader: Some(loader),
            speech: OnceCell::new(),
        }
    }

    /// Moderates one message event, dispatching by content shape.
    pub async fn moderate_message(&self, event: &MessageEvent) -> ModerationResult {
        if !event.has_media && !event.text.is_empty() {
            info!(message_id = event.message_id, "moderating text message");
            return self.model.moderate_text(&event.text).await;
        }

        if let Some(media) = &event.media {
            debug!(
                message_id = event.message_id,
                media_type = %media.media_type,
                "moderating media message"
            );

            match media.media_type.as_str() {
                "photo" => return self.moderate_photo(event, media).await,
                "voicenote" | "voice" => return self.moderate_voice_note(event, media).await,
                // Video content is never inspected in this design.
                "video" => return ModerationResult::neutral(NO_CONTENT),
                _ => {
                    if let Some(caption) = &media.caption {
                        return self.model.moderate_text(caption).await;
                    }
                }
            }
        }

        debug!(message_id = event.message_id, "no content to moderate");
        ModerationResult::neutral(NO_CONTENT)
    }

    async fn moderate_photo(&self, event: &MessageEvent, media: &MediaInfo) -> ModerationResult {
        match self.download(event, media).await {
            Some(image) => self.model.moderate_image(&image, media.caption.as_deref()).await,
            None => {
                warn!(message_id = event.message_id, "failed to download photo");
                match &media.caption {
                    Some(caption) => self.model.moderate_text(caption).await,
                    None => ModerationResult::neutral(DOWNLOAD_FAILED),
                }
            }
        }
    }

    async fn moderate_voice_note(
        &self,
        event: &MessageEvent,
        media: &MediaInfo,
    ) -> ModerationResult {
        let audio = match self.download(event, media).await {
            Some(audio) => audio,
            None => {
                warn!(message_id = event.message_id, "failed to download voice note");
                return match &media.caption {
                    Some(caption) => self.model.moderate_text(caption).await,
                    None => ModerationResult::neutral(DOWNLOAD_FAILED),
                };
            }
        };

        let Some(speech) = self.speech_backend().await else {
            return ModerationResult::neutral("Transcription unavailable");
        };

        match speech.transcribe(&audio).await {
            Ok(transcription) => {
                info!(
                    message_id = event.message_id,
                    language = transcription.language.as_deref().unwrap_or("unknown"),
                    "voice transcribed"
                );
                self.model.moderate_voice(&transcription.text).await
            }
            Err(e) => {
                warn!(message_id = event.message_id, error = %e, "failed to transcribe voice");
                ModerationResult::neutral("Failed to transcribe voice")
            }
        }
    }

    /// The speech backend, loaded once on first use. A missing or failing
    /// loader leaves voice moderation disabled without blocking anything.
    async fn speech_backend(&self) -> Option<Arc<dyn SpeechToText>> {
        self.speech
            .get_or_init(|| async {
                let loader = self.speech_loader.as_ref()?;
                match loader() {
                    Ok(backend) => Some(backend),
                    Err(e) => {
                        error!(error = %e, "failed to load speech backend");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    async fn download(&self, event: &MessageEvent, media: &MediaInfo) -> Option<Vec<u8>> {
        let file_id = media.file_id?;
        event.client.download_file(file_id).await
    }
}
