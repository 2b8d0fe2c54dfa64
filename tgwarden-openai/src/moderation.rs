//! OpenAI moderation endpoint backend.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    CreateModerationRequestArgs, ModerationContentPart, ModerationImageUrl, ModerationInput,
};
use async_openai::Client;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use tracing::{error, info};

use tgwarden_ai::moderation::{ModerationModel, ModerationResult};

const DEFAULT_MODEL: &str = "omni-moderation-latest";
const CLEAN_REASON: &str = "Content is acceptable";
const CLEAN_CONFIDENCE: f32 = 0.95;

/// Moderation model backed by the OpenAI moderations API. API failures map
/// to a neutral non-deleting result; moderation never blocks delivery.
pub struct OpenAiModeration {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiModeration {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self::with_model(client, DEFAULT_MODEL)
    }

    pub fn with_model(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        let model = model.into();
        info!(model = %model, "openai moderation model initialized");
        Self { client, model }
    }

    async fn moderate(&self, input: ModerationInput) -> ModerationResult {
        let request = match CreateModerationRequestArgs::default()
            .model(&self.model)
            .input(input)
            .build()
        {
            Ok(request) => request,
            Err(err) => {
                error!(error = %err, "failed to build moderation request");
                return ModerationResult::neutral("API error");
            }
        };

        match self.client.moderations().create(request).await {
            Ok(response) => match response.results.into_iter().next() {
                Some(result) => verdict(
                    result.flagged,
                    serde_json::to_value(&result.categories).unwrap_or(Value::Null),
                    serde_json::to_value(&result.category_scores).unwrap_or(Value::Null),
                ),
                None => ModerationResult::neutral("API error"),
            },
            Err(err) => {
                error!(error = %err, "moderation API call failed");
                ModerationResult::neutral("API error")
            }
        }
    }
}

/// Maps one raw moderation result into a verdict: flagged category names
/// become the violation list and reason, the highest category score becomes
/// the confidence.
fn verdict(flagged: bool, categories: Value, scores: Value) -> ModerationResult {
    if !flagged {
        return ModerationResult {
            should_delete: false,
            should_warn: false,
            reason: CLEAN_REASON.to_string(),
            confidence: CLEAN_CONFIDENCE,
            violations: Vec::new(),
        };
    }

    let mut violations: Vec<String> = categories
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter(|(_, value)| value.as_bool() == Some(true))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default();
    violations.sort();

    let confidence = scores
        .as_object()
        .map(|object| {
            object
                .values()
                .filter_map(Value::as_f64)
                .fold(0.0, f64::max) as f32
        })
        .unwrap_or(0.0);

    ModerationResult::violation(violations.join(", "), confidence, violations)
}

#[async_trait]
impl ModerationModel for OpenAiModeration {
    async fn moderate_text(&self, text: &str) -> ModerationResult {
        self.moderate(ModerationInput::String(text.to_string())).await
    }

    async fn moderate_image(&self, image: &[u8], caption: Option<&str>) -> ModerationResult {
        let mut parts = Vec::new();
        if let Some(caption) = caption {
            parts.push(ModerationContentPart::Text {
                text: caption.to_string(),
            });
        }
        parts.push(ModerationContentPart::ImageUrl {
            image_url: ModerationImageUrl {
                url: format!("data:image/jpeg;base64,{}", BASE64.encode(image)),
            },
        });
        self.moderate(ModerationInput::MultiModal(parts)).await
    }

    async fn moderate_voice(&self, transcription: &str) -> ModerationResult {
        self.moderate_text(transcription).await
    }
}
