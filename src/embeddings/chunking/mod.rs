
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{RagError, Result};

pub const DEFAULT_CHUNK_LENGTH: usize = 400;

/// Configuration for word-count chunking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Number of whitespace-delimited words per chunk
    pub chunk_length: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_length: DEFAULT_CHUNK_LENGTH,
        }
    }
}

/// Split text into consecutive runs of `chunk_length` words.
///
/// Words are whitespace-delimited and each run is rejoined with single
/// spaces. The final run may be shorter. Empty or whitespace-only text
/// yields no chunks.
#[inline]
pub fn chunk_words(text: &str, chunk_length: usize) -> Result<Vec<String>> {
    if chunk_length == 0 {
        return Err(RagError::InvalidArgument(
            "chunk length must be greater than zero".to_string(),
        ));
    }

    let words = text.split_whitespace().collect::<Vec<_>>();
    let chunks = words
        .chunks(chunk_length)
        .map(|run| run.join(" "))
        .collect::<Vec<_>>();

    debug!(
        "Chunked {} words into {} chunks of up to {} words",
        words.len(),
        chunks.len(),
        chunk_length
    );

    Ok(chunks)
}

/// Number of chunks `chunk_words` produces for a given word count
#[inline]
pub const fn expected_chunk_count(word_count: usize, chunk_length: usize) -> usize {
    word_count.div_ceil(chunk_length)
}
