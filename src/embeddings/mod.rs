// Embeddings module
// Word-count chunking and the sentence-embedding model used for corpus and queries

pub mod chunking;
pub mod ollama;

pub use chunking::{ChunkingConfig, DEFAULT_CHUNK_LENGTH, chunk_words};
pub use ollama::OllamaEmbedder;

use crate::Result;

/// A sentence-embedding model.
///
/// The same instance must embed both the corpus and every query so the
/// resulting vectors are comparable.
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Embed each input text, returning one vector per input in the same order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Name of the underlying model, for logging
    fn model_name(&self) -> &str;

    /// Embed a single text
    #[inline]
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()])?;
        vectors.pop().ok_or_else(|| {
            crate::RagError::Embedding("embedding model returned no vector".to_string())
        })
    }
}
