//! Knowledge base service: load a source corpus, chunk it, index it into a
//! vector store, and search it.

use std::sync::Arc;

use tracing::{info, warn};

use crate::chunker::chunk_texts;
use crate::source::TextSource;
use crate::store::{ScoredDocument, VectorStore};

pub struct KnowledgeBase {
    source: Arc<dyn TextSource>,
    store: Arc<dyn VectorStore>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl KnowledgeBase {
    pub fn new(
        source: Arc<dyn TextSource>,
        store: Arc<dyn VectorStore>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        info!(chunk_size, chunk_overlap, "knowledge base initialized");
        Self {
            source,
            store,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Loads the source, chunks it, and indexes the chunks.
    ///
    /// Idempotent: when the store already holds documents and
    /// `force_rebuild` is false, returns the existing count without
    /// touching anything. Forced rebuilds clear the store first.
    ///
    /// Hard errors: missing source; zero chunks from the source.
    pub async fn build_index(&self, force_rebuild: bool) -> anyhow::Result<usize> {
        if !force_rebuild && self.store.exists().await {
            let doc_count = self.store.count().await;
            info!(doc_count, "vector store already exists, skipping build");
            return Ok(doc_count);
        }

        if force_rebuild {
            warn!("force rebuilding index, clearing existing data");
            self.store.clear().await?;
        }

        anyhow::ensure!(self.source.exists(), "knowledge base source does not exist");

        let texts = self.source.load()?;
        info!(segments = texts.len(), "loaded text segments from source");

        let chunks = chunk_texts(&texts, self.chunk_size, self.chunk_overlap);
        anyhow::ensure!(!chunks.is_empty(), "no chunks produced from source");

        info!(chunks = chunks.len(), "created chunks from texts");
        let ids = (0..chunks.len()).map(|i| i.to_string()).collect();
        let (documents, metadatas) = chunks
            .into_iter()
            .map(|c| (c.text, c.metadata))
            .unzip::<_, _, Vec<_>, Vec<_>>();
        let indexed = documents.len();

        self.store.add(documents, metadatas, ids).await?;

        info!(indexed, "indexing completed");
        Ok(indexed)
    }

    /// Semantic search over the indexed corpus.
    pub async fn search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<ScoredDocument>> {
        let results = self.store.query(query, top_k).await?;
        info!(results = results.len(), "knowledge base search");
        Ok(results)
    }

    /// Removes all indexed data.
    pub async fn clear(&self) -> anyhow::Result<()> {
        info!("clearing knowledge base index");
        self.store.clear().await
    }
}
