// Answer generation module
// The hosted LLM that turns a grounded prompt into an answer

pub mod openai;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub use openai::OpenAiClient;

/// Identifies one chat session with the answer generator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// A new session id derived from the current time, e.g. `session_1718000000`
    #[inline]
    pub fn generate() -> Self {
        Self(format!("session_{}", chrono::Utc::now().timestamp()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Provider returned no answer")]
    EmptyResponse,

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("Generation task failed: {0}")]
    Join(String),
}

/// A hosted model that answers a single prompt within a session
#[async_trait]
pub trait AnswerGenerator: Send + Sync + fmt::Debug {
    async fn generate(&self, prompt: &str, session: &SessionId) -> Result<String, GenerationError>;
}
