// Assistant module
// One chat session: builds the knowledge base once and answers questions against it


use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::config::{Config, CorpusConfig, RetrievalConfig};
use crate::embeddings::Embedder;
use crate::embeddings::chunking::ChunkingConfig;
use crate::generation::{AnswerGenerator, SessionId};
use crate::knowledge::KnowledgeBase;
use crate::prompt::{PromptBuilder, REFUSAL_MESSAGE, is_refusal};
use crate::{RagError, Result};

/// Shown when an answer could not be produced for a reason other than the question itself
pub const FALLBACK_MESSAGE: &str = "Sorry, I had trouble understanding you. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The generator answered from the retrieved context
    Answered,
    /// The question is outside the reference documents
    OutOfDomain,
    /// Embedding or searching the question failed
    RetrievalFailed,
    /// The answer generator could not be reached or returned an error
    GenerationFailed,
}

/// What the user sees for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub outcome: ReplyOutcome,
}

impl Reply {
    fn new(text: impl Into<String>, outcome: ReplyOutcome) -> Self {
        Self {
            text: text.into(),
            outcome,
        }
    }
}

/// A chat session over a lazily built, shared knowledge base
#[derive(Debug)]
pub struct Assistant {
    corpus: CorpusConfig,
    chunking: ChunkingConfig,
    max_distance: Option<f32>,
    prompt_builder: PromptBuilder,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn AnswerGenerator>,
    knowledge: OnceCell<Arc<KnowledgeBase>>,
    session: SessionId,
}

impl Assistant {
    #[inline]
    pub fn new(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self::with_parts(
            config.corpus.clone(),
            config.chunking,
            &config.retrieval,
            embedder,
            generator,
        )
    }

    #[inline]
    pub fn with_parts(
        corpus: CorpusConfig,
        chunking: ChunkingConfig,
        retrieval: &RetrievalConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            corpus,
            chunking,
            max_distance: retrieval.max_distance,
            prompt_builder: PromptBuilder::new(retrieval),
            embedder,
            generator,
            knowledge: OnceCell::new(),
            session: SessionId::generate(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = session;
        self
    }

    #[inline]
    pub const fn session(&self) -> &SessionId {
        &self.session
    }

    /// Build the knowledge base if it has not been built yet.
    ///
    /// Concurrent callers wait for a single build; later calls return the
    /// existing knowledge base. A failed build leaves the assistant
    /// uninitialized so a later call can try again.
    #[inline]
    pub async fn initialize(&self) -> Result<Arc<KnowledgeBase>> {
        let knowledge = self
            .knowledge
            .get_or_try_init(|| async {
                info!(
                    "Initializing {} from {}",
                    self.session,
                    self.corpus.directory.display()
                );

                let corpus = self.corpus.clone();
                let chunking = self.chunking;
                let embedder = Arc::clone(&self.embedder);

                tokio::task::spawn_blocking(move || {
                    KnowledgeBase::from_directory(&corpus, &chunking, embedder)
                })
                .await
                .map_err(|e| {
                    RagError::Other(anyhow::anyhow!("knowledge base build panicked: {}", e))
                })?
                .map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(knowledge))
    }

    #[inline]
    pub fn knowledge(&self) -> Option<&Arc<KnowledgeBase>> {
        self.knowledge.get()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.knowledge.initialized()
    }

    /// Answer one question.
    ///
    /// Fails only when the knowledge base has not been initialized; every
    /// per-question failure is turned into a polite reply.
    #[inline]
    pub async fn respond(&self, question: &str) -> Result<Reply> {
        let knowledge = self.knowledge().ok_or(RagError::NotInitialized)?;

        let builder = self.prompt_builder;
        let knowledge = Arc::clone(knowledge);
        let query = question.to_string();
        let prompt = tokio::task::spawn_blocking(move || builder.build_prompt(&knowledge, &query))
            .await
            .map_err(|e| RagError::Other(anyhow::anyhow!("retrieval task panicked: {}", e)))
            .and_then(|built| built);

        let prompt = match prompt {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("Retrieval failed in {}: {}", self.session, e);
                return Ok(Reply::new(FALLBACK_MESSAGE, ReplyOutcome::RetrievalFailed));
            }
        };

        if prompt.is_out_of_domain(self.max_distance) {
            info!(
                "Question is out of domain (best distance {:?}, threshold {:?})",
                prompt.best_distance(),
                self.max_distance
            );
            return Ok(Reply::new(REFUSAL_MESSAGE, ReplyOutcome::OutOfDomain));
        }

        debug!("Sending {} character prompt to generator", prompt.text.len());

        match self.generator.generate(&prompt.text, &self.session).await {
            Ok(text) if is_refusal(&text) => Ok(Reply::new(text, ReplyOutcome::OutOfDomain)),
            Ok(text) => Ok(Reply::new(text, ReplyOutcome::Answered)),
            Err(e) => {
                error!("Answer generation failed in {}: {}", self.session, e);
                Ok(Reply::new(FALLBACK_MESSAGE, ReplyOutcome::GenerationFailed))
            }
        }
    }
}
