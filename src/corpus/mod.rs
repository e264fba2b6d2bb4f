// Corpus module
// Source documents and the word-count chunks built from them

pub mod loader;


use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Result;
use crate::embeddings::chunking::chunk_words;

pub use loader::load_documents;

/// A source document and its extracted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name, used as the document identifier
    pub name: String,
    /// Extracted text, empty when extraction failed
    pub text: String,
}

/// A word-count segment of a document.
///
/// Its position in the corpus is its row id in the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Name of the document this chunk came from
    pub source: String,
    /// Position of this chunk among the chunks of its document
    pub chunk_index: usize,
}

/// Chunk every document and tag each chunk with its source and position
#[inline]
pub fn build_corpus(documents: &[Document], chunk_length: usize) -> Result<Vec<Chunk>> {
    let mut corpus = Vec::new();

    for document in documents {
        let pieces = chunk_words(&document.text, chunk_length)?;
        debug!("Document {} produced {} chunks", document.name, pieces.len());

        corpus.extend(
            pieces
                .into_iter()
                .enumerate()
                .map(|(chunk_index, text)| Chunk {
                    text,
                    source: document.name.clone(),
                    chunk_index,
                }),
        );
    }

    info!(
        "Built corpus of {} chunks from {} documents",
        corpus.len(),
        documents.len()
    );
    Ok(corpus)
}
