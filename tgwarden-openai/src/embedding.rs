//! OpenAI embeddings backend for the knowledge base.

use async_openai::config::OpenAIConfig;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, info};

use tgwarden_kb::EmbeddingService;

const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Embedding service over the OpenAI embeddings API.
#[derive(Clone)]
pub struct OpenAiEmbedding {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbedding {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self::with_model(client, DEFAULT_MODEL)
    }

    pub fn with_model(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        let model = model.into();
        info!(model = %model, "openai embedding service initialized");
        Self { client, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(text)
            .build()?;

        let response = self.client.embeddings().create(request).await?;
        let embedding = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("no embedding in response"))?;

        debug!(dims = embedding.embedding.len(), "embedded one text");
        Ok(embedding.embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(texts.to_vec())
            .build()?;

        let mut response = self.client.embeddings().create(request).await?;
        // The API does not guarantee order; sort by index before unzipping.
        response.data.sort_by_key(|d| d.index);

        debug!(count = response.data.len(), "embedded batch");
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}
