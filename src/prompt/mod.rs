// Prompt module
// Builds the grounded prompt sent to the answer generator

#[cfg(test)]
mod tests;

use itertools::Itertools;
use tracing::debug;

use crate::Result;
use crate::config::RetrievalConfig;
use crate::knowledge::{KnowledgeBase, RetrievedContext};

/// Appended to every question so answers suit a general audience
pub const STYLE_DIRECTIVE: &str = "Use plain, everyday language that anyone can understand. \
Avoid technical terms or specialized vocabulary. Keep responses concise under 150 words unless \
the user wants you to explain the question in detail. Aim for clarity, simplicity, and easy \
readability for a general audience.";

/// The exact reply expected for questions the reference documents cannot answer
pub const REFUSAL_MESSAGE: &str = "Sorry unable to provide the answer. The question that you \
asked is outside my knowledge base. I am a chatbot designed only to answer questions about \
Polycystic Kidney Disease";

/// The part of the refusal that survives the model rewording punctuation or quotes
const REFUSAL_MARKER: &str = "outside my knowledge base";

/// Whether a generated answer is the refusal sentence.
///
/// Case, punctuation, quote style and spacing are ignored.
#[inline]
pub fn is_refusal(answer: &str) -> bool {
    normalize(answer).contains(&normalize(REFUSAL_MARKER))
}

fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .join(" ")
}

/// A built prompt and the retrieval results it was grounded on
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPrompt {
    pub text: String,
    /// Retrieved chunks in ascending distance order
    pub contexts: Vec<RetrievedContext>,
}

impl BuiltPrompt {
    /// Distance of the closest retrieved chunk
    #[inline]
    pub fn best_distance(&self) -> Option<f32> {
        self.contexts.first().map(|c| c.distance)
    }

    /// Whether the closest chunk is further away than `max_distance`
    #[inline]
    pub fn is_out_of_domain(&self, max_distance: Option<f32>) -> bool {
        match (max_distance, self.best_distance()) {
            (Some(max), Some(best)) => best > max,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// Turns user questions into retrieval-grounded prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    k: usize,
}

impl Default for PromptBuilder {
    #[inline]
    fn default() -> Self {
        Self { k: 1 }
    }
}

impl PromptBuilder {
    #[inline]
    pub fn new(retrieval: &RetrievalConfig) -> Self {
        Self { k: retrieval.k }
    }

    #[inline]
    pub const fn k(&self) -> usize {
        self.k
    }

    /// The user's question followed by the style directive and the refusal instruction
    #[inline]
    pub fn augment_query(user_query: &str) -> String {
        format!(
            "{} {} If you cannot answer from the context, reply: \"{}\"",
            user_query.trim(),
            STYLE_DIRECTIVE,
            REFUSAL_MESSAGE
        )
    }

    /// Retrieve the nearest chunks for `user_query` and assemble the prompt
    #[inline]
    pub fn build_prompt(&self, knowledge: &KnowledgeBase, user_query: &str) -> Result<BuiltPrompt> {
        let augmented = Self::augment_query(user_query);

        let contexts = knowledge
            .retrieve(&augmented, self.k)?
            .into_iter()
            .unique_by(|c| (c.chunk.source.clone(), c.chunk.chunk_index))
            .collect::<Vec<_>>();

        debug!(
            "Retrieved {} chunks for prompt (best distance {:?})",
            contexts.len(),
            contexts.first().map(|c| c.distance)
        );

        let context = contexts.iter().map(|c| c.chunk.text.as_str()).join("\n\n");
        let text = render(&context, &augmented);

        Ok(BuiltPrompt { text, contexts })
    }
}

fn render(context: &str, question: &str) -> String {
    format!("Context:\n{}\n\nQuestion: {}", context, question)
}
