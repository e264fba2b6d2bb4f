
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{AnswerGenerator, GenerationError, SessionId};
use crate::RagError;
use crate::config::GenerationConfig;

pub const SYSTEM_DESCRIPTION: &str = "You are CysticCare AI, a support assistant for patients \
with Polycystic Kidney Disease, a genetic disorder in which many fluid-filled cysts grow in the \
kidneys and can eventually lead to kidney failure.";

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    endpoint: Url,
    model: String,
    api_key: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiClient {
    #[inline]
    pub fn new(config: &GenerationConfig, api_key: String) -> crate::Result<Self> {
        let endpoint = config
            .api_url()
            .and_then(|base| {
                base.join("chat/completions")
                    .map_err(|_| crate::config::ConfigError::InvalidUrl(config.api_base.clone()))
            })
            .map_err(|e| RagError::Config(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key,
            agent,
        })
    }

    /// Create a client using the API key from the configured environment variable
    #[inline]
    pub fn from_env(config: &GenerationConfig) -> crate::Result<Self> {
        let api_key = config.api_key()?;
        Self::new(config, api_key)
    }

    fn complete(&self, prompt: &str, session: &SessionId) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_DESCRIPTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            user: session.as_str(),
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        debug!(
            "Requesting completion from {} for {} ({} prompt characters)",
            self.endpoint,
            session,
            prompt.len()
        );

        let mut response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send(&body)
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map_or(text, |envelope| envelope.error.message);
            warn!("Answer generation failed with HTTP {}: {}", status, message);
            return Err(GenerationError::Provider { status, message });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str, session: &SessionId) -> Result<String, GenerationError> {
        let client = self.clone();
        let prompt = prompt.to_string();
        let session = session.clone();

        tokio::task::spawn_blocking(move || client.complete(&prompt, &session))
            .await
            .map_err(|e| GenerationError::Join(e.to_string()))?
    }
}
