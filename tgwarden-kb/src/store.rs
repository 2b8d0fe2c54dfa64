//! Vector store capability trait.

use async_trait::async_trait;

use crate::chunker::ChunkMetadata;

/// One retrieval hit. `distance` is a similarity distance where smaller is
/// closer; results are returned in ascending distance order.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

/// Abstract vector storage: documents in, ranked documents out.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Adds documents with aligned metadata and ids.
    async fn add(
        &self,
        documents: Vec<String>,
        metadatas: Vec<ChunkMetadata>,
        ids: Vec<String>,
    ) -> anyhow::Result<()>;

    /// Semantic search for the `top_k` closest documents.
    async fn query(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<ScoredDocument>>;

    /// Deletes all stored documents.
    async fn clear(&self) -> anyhow::Result<()>;

    /// True when the store already holds documents.
    async fn exists(&self) -> bool;

    async fn count(&self) -> usize;
}
