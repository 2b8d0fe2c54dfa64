//! Retrieval seam consumed by the chat agent.

use std::sync::Arc;

use async_trait::async_trait;

use crate::knowledge_base::KnowledgeBase;
use crate::store::ScoredDocument;

/// Retrieves the most relevant knowledge snippets for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<ScoredDocument>>;
}

/// Retriever backed by a [`KnowledgeBase`].
pub struct KbRetriever {
    kb: Arc<KnowledgeBase>,
}

impl KbRetriever {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }
}

#[async_trait]
impl Retriever for KbRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<ScoredDocument>> {
        self.kb.search(query, top_k).await
    }
}
