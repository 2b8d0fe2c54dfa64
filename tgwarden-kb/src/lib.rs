//! # tgwarden-kb
//!
//! Knowledge base pipeline for RAG: text sources, fixed-window chunking,
//! the vector-store and embedding-service seams, an in-memory embedded
//! store, and the retriever consumed by the chat agent.

pub mod chunker;
pub mod embedding;
pub mod knowledge_base;
pub mod memory_store;
pub mod retriever;
pub mod source;
pub mod store;

pub use chunker::{chunk_texts, Chunk, ChunkMetadata};
pub use embedding::EmbeddingService;
pub use knowledge_base::KnowledgeBase;
pub use memory_store::EmbeddedVectorStore;
pub use retriever::{KbRetriever, Retriever};
pub use source::{FileTextSource, TextSource};
pub use store::{ScoredDocument, VectorStore};
