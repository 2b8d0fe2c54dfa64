//! OpenAI chat completion backend with structured output.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
};
use async_openai::Client;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use tgwarden_ai::chat_model::{ChatModel, ChatResponse, ChatRole, ChatTurn};
use tgwarden_ai::language::{apology_for, detect_language};

const TEMPERATURE: f32 = 0.3;

/// Shape the model is asked to fill. Mirrors [`ChatResponse`] minus the
/// locally-detected language fallback.
#[derive(Debug, Deserialize)]
struct StructuredReply {
    message: String,
    #[serde(default)]
    should_escalate: bool,
    #[serde(default)]
    escalation_reason: Option<String>,
    #[serde(default = "default_confidence")]
    confidence: f32,
    #[serde(default)]
    language: Option<String>,
}

fn default_confidence() -> f32 {
    1.0
}

fn reply_schema() -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            name: "chat_reply".to_string(),
            description: Some("Structured reply to a user message".to_string()),
            schema: Some(json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" },
                    "should_escalate": { "type": "boolean" },
                    "escalation_reason": { "type": ["string", "null"] },
                    "confidence": { "type": "number" },
                    "language": { "type": ["string", "null"] }
                },
                "required": [
                    "message",
                    "should_escalate",
                    "escalation_reason",
                    "confidence",
                    "language"
                ],
                "additionalProperties": false
            })),
            strict: Some(true),
        },
    }
}

fn parse_reply(content: &str, user_language: Option<&str>) -> anyhow::Result<ChatResponse> {
    let parsed: StructuredReply = serde_json::from_str(content)?;
    Ok(ChatResponse {
        message: parsed.message,
        should_escalate: parsed.should_escalate,
        escalation_reason: parsed.escalation_reason,
        confidence: parsed.confidence,
        language: parsed.language.or_else(|| user_language.map(str::to_string)),
    })
}

/// Chat model backed by the OpenAI chat completions API.
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        let model = model.into();
        info!(model = %model, "openai chat model initialized");
        Self { client, model }
    }

    fn build_messages(
        system_prompt: &str,
        user_message: &str,
        history: &[ChatTurn],
        rag_context: Option<&str>,
    ) -> anyhow::Result<Vec<ChatCompletionRequestMessage>> {
        let mut system_content = system_prompt.to_string();
        if let Some(context) = rag_context {
            system_content.push_str("\n\nRelevant information:\n");
            system_content.push_str(context);
        }

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_content)
                .build()?
                .into(),
        ];

        for turn in history {
            let message = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()?
                    .into(),
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()?
                    .into(),
            };
            messages.push(message);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()?
                .into(),
        );

        Ok(messages)
    }

    async fn request(
        &self,
        system_prompt: &str,
        user_message: &str,
        history: &[ChatTurn],
        rag_context: Option<&str>,
        user_language: Option<&str>,
    ) -> anyhow::Result<ChatResponse> {
        let messages = Self::build_messages(system_prompt, user_message, history, rag_context)?;
        debug!(count = messages.len(), "sending structured chat request");

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(TEMPERATURE)
            .response_format(reply_schema())
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("empty chat completion"))?;

        parse_reply(&content, user_language)
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
        history: &[ChatTurn],
        rag_context: Option<&str>,
    ) -> ChatResponse {
        let user_language = detect_language(user_message);

        match self
            .request(
                system_prompt,
                user_message,
                history,
                rag_context,
                user_language.as_deref(),
            )
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "chat completion failed");
                ChatResponse {
                    message: apology_for(user_language.as_deref()).to_string(),
                    should_escalate: true,
                    escalation_reason: Some("API error".to_string()),
                    confidence: 0.0,
                    language: user_language,
                }
            }
        }
    }
}
