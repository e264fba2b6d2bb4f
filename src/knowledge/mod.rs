// Knowledge base module
// The corpus, its vector index and the embedder, built once and read-only afterwards


use itertools::Itertools;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::CorpusConfig;
use crate::corpus::{Chunk, build_corpus, load_documents};
use crate::embeddings::Embedder;
use crate::embeddings::chunking::ChunkingConfig;
use crate::index::{FlatIndex, SearchHit};
use crate::{RagError, Result};

/// A chunk retrieved for a query along with its distance
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    pub chunk: Chunk,
    pub distance: f32,
}

/// Summary of a built knowledge base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeStats {
    /// Documents loaded from the corpus directory
    pub documents: usize,
    /// Documents that produced at least one chunk
    pub indexed_documents: usize,
    pub chunks: usize,
    pub dimension: usize,
}

/// The in-memory retrieval state: corpus chunks, their embeddings and the
/// model used to embed them.
///
/// Row `i` of the index always corresponds to `corpus[i]`.
#[derive(Debug)]
pub struct KnowledgeBase {
    corpus: Vec<Chunk>,
    index: FlatIndex,
    embedder: Arc<dyn Embedder>,
    document_count: usize,
}

impl KnowledgeBase {
    /// Load, chunk, embed and index every document in the corpus directory
    #[inline]
    pub fn from_directory(
        corpus: &CorpusConfig,
        chunking: &ChunkingConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let started = Instant::now();
        let documents = load_documents(&corpus.directory, &corpus.extensions)?;
        let chunks = build_corpus(&documents, chunking.chunk_length)?;

        if chunks.is_empty() {
            return Err(RagError::CorpusLoad {
                path: corpus.directory.display().to_string(),
                message: format!(
                    "no text could be extracted from {} documents",
                    documents.len()
                ),
            });
        }

        let mut knowledge = Self::from_chunks(chunks, embedder)?;
        knowledge.document_count = documents.len();
        info!(
            "Knowledge base ready: {} chunks from {} documents in {:?}",
            knowledge.len(),
            documents.len(),
            started.elapsed()
        );
        Ok(knowledge)
    }

    /// Embed and index an already chunked corpus
    #[inline]
    pub fn from_chunks(corpus: Vec<Chunk>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if corpus.is_empty() {
            return Err(RagError::InvalidArgument(
                "cannot build a knowledge base from an empty corpus".to_string(),
            ));
        }

        let texts = corpus.iter().map(|c| c.text.clone()).collect::<Vec<_>>();
        debug!(
            "Embedding {} chunks with model {}",
            texts.len(),
            embedder.model_name()
        );
        let embeddings = embedder.embed(&texts)?;

        if embeddings.len() != corpus.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, received {}",
                corpus.len(),
                embeddings.len()
            )));
        }

        let index = FlatIndex::build(embeddings)?;
        let document_count = count_sources(&corpus);

        Ok(Self {
            corpus,
            index,
            embedder,
            document_count,
        })
    }

    /// Embed `query` and return up to `k` nearest chunks by ascending distance.
    ///
    /// `k` is clamped to the corpus size.
    #[inline]
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedContext>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be at least 1".to_string()));
        }

        let query_vector = self.embedder.embed_one(query)?;
        let hits = self.index.search(&query_vector, k.min(self.len()))?;

        Ok(hits
            .into_iter()
            .map(|SearchHit { id, distance }| RetrievedContext {
                chunk: self.corpus[id].clone(),
                distance,
            })
            .collect())
    }

    #[inline]
    pub fn corpus(&self) -> &[Chunk] {
        &self.corpus
    }

    #[inline]
    pub const fn index(&self) -> &FlatIndex {
        &self.index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats {
            documents: self.document_count,
            indexed_documents: count_sources(&self.corpus),
            chunks: self.corpus.len(),
            dimension: self.index.dimension(),
        }
    }
}

/// Number of distinct documents in a corpus whose chunks are grouped by document
fn count_sources(corpus: &[Chunk]) -> usize {
    corpus.iter().dedup_by(|a, b| a.source == b.source).count()
}
