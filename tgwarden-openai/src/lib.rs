//! OpenAI-backed implementations of the AI capability traits.
//!
//! Four adapters over one `async-openai` client: chat completion with
//! structured output ([`OpenAiChatModel`]), the moderation endpoint
//! ([`OpenAiModeration`]), Whisper transcription ([`WhisperSpeech`]) and
//! text embeddings ([`OpenAiEmbedding`]).

pub mod chat;
pub mod embedding;
pub mod moderation;
pub mod speech;

use async_openai::config::OpenAIConfig;
use async_openai::Client;

pub use chat::OpenAiChatModel;
pub use embedding::OpenAiEmbedding;
pub use moderation::OpenAiModeration;
pub use speech::WhisperSpeech;

/// Builds an OpenAI client, optionally pointed at a compatible endpoint.
pub fn build_client(api_key: &str, base_url: Option<&str>) -> Client<OpenAIConfig> {
    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(url) = base_url.filter(|s| !s.is_empty()) {
        config = config.with_api_base(url);
    }
    Client::with_config(config)
}
