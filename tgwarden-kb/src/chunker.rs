//! Fixed-window text chunking with overlap.
//!
//! Windows are `chunk_size` characters with stride `chunk_size - overlap`;
//! the last window may be shorter. Offsets in the metadata are character
//! offsets into the source segment.

use serde::{Deserialize, Serialize};

/// Position of a chunk within the source corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source_index: usize,
    pub chunk_index: usize,
    pub start: usize,
    pub end: usize,
}

/// One chunk of text plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Splits each source segment into overlapping character windows. Empty
/// segments yield no chunks; a segment shorter than `chunk_size` yields
/// exactly one.
pub fn chunk_texts(texts: &[String], chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let stride = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();

    for (source_index, text) in texts.iter().enumerate() {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut start = 0;
        let mut chunk_index = 0;

        while start < len {
            let end = (start + chunk_size).min(len);
            chunks.push(Chunk {
                text: chars[start..end].iter().collect(),
                metadata: ChunkMetadata {
                    source_index,
                    chunk_index,
                    start,
                    end,
                },
            });
            if end == len {
                break;
            }
            start += stride;
            chunk_index += 1;
        }
    }

    chunks
}
