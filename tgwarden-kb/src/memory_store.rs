//! In-memory vector store over an [`EmbeddingService`].
//!
//! Documents are embedded on insert; queries are answered by cosine
//! distance over the stored vectors. Thread safety comes from
//! `tokio::sync::RwLock`; data lives only for the process lifetime.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::chunker::ChunkMetadata;
use crate::embedding::EmbeddingService;
use crate::store::{ScoredDocument, VectorStore};

struct StoredChunk {
    id: String,
    text: String,
    metadata: ChunkMetadata,
    vector: Vec<f32>,
}

/// Embedding-backed in-memory vector store.
pub struct EmbeddedVectorStore {
    embedder: Arc<dyn EmbeddingService>,
    entries: RwLock<Vec<StoredChunk>>,
}

impl EmbeddedVectorStore {
    pub fn new(embedder: Arc<dyn EmbeddingService>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Ids of all stored documents, in insertion order.
    pub async fn ids(&self) -> Vec<String> {
        self.entries.read().await.iter().map(|e| e.id.clone()).collect()
    }
}

/// Cosine distance in `[0, 2]`; 0 means identical direction. Zero-norm
/// vectors are treated as maximally distant.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 2.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for EmbeddedVectorStore {
    async fn add(
        &self,
        documents: Vec<String>,
        metadatas: Vec<ChunkMetadata>,
        ids: Vec<String>,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(
            documents.len() == metadatas.len() && documents.len() == ids.len(),
            "documents, metadatas and ids must be aligned"
        );

        let vectors = self.embedder.embed_batch(&documents).await?;

        let mut entries = self.entries.write().await;
        for (((id, text), metadata), vector) in ids
            .into_iter()
            .zip(documents)
            .zip(metadatas)
            .zip(vectors)
        {
            entries.push(StoredChunk {
                id,
                text,
                metadata,
                vector,
            });
        }
        info!(count = entries.len(), "vector store updated");
        Ok(())
    }

    async fn query(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<ScoredDocument>> {
        let query_vector = self.embedder.embed(query).await?;

        let entries = self.entries.read().await;
        let mut scored: Vec<ScoredDocument> = entries
            .iter()
            .map(|entry| ScoredDocument {
                document: entry.text.clone(),
                metadata: entry.metadata.clone(),
                distance: cosine_distance(&query_vector, &entry.vector),
            })
            .collect();

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_k);

        debug!(results = scored.len(), "vector store query");
        Ok(scored)
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn exists(&self) -> bool {
        !self.entries.read().await.is_empty()
    }

    async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}
