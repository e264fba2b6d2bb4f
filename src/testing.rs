// Deterministic stand-ins for the embedding model and the answer generator

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::Result;
use crate::embeddings::Embedder;
use crate::generation::{AnswerGenerator, GenerationError, SessionId};

pub const VOCABULARY: &[&str] = &[
    "pkd", "genetic", "cysts", "dialysis", "blood", "pressure", "football", "recipe",
];

/// Counts occurrences of a fixed vocabulary, one dimension per word
#[derive(Debug, Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; VOCABULARY.len()];
    for token in text.split_whitespace() {
        let token = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if let Some(position) = VOCABULARY.iter().position(|word| *word == token) {
            vector[position] += 1.0;
        }
    }
    vector
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// Replies with a fixed answer, or fails every call, recording the prompts it was given
#[derive(Debug)]
pub struct ScriptedGenerator {
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl AnswerGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _session: &SessionId,
    ) -> std::result::Result<String, GenerationError> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());

        self.answer.clone().ok_or_else(|| GenerationError::Provider {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}
