//! Completion-service contract and the bundled HTTP adapter.
//!
//! The generation backend is external; the engine reaches it only through
//! the narrow "prompt in, text out" contract below. A failed call is
//! reported distinctly from a successful-but-empty response so each
//! condensation step can fall back on failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Timeout applied around completion calls, independent of any timeout the
/// client enforces itself.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);

/// Completion failure, distinct from an empty success.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion backend returned status {0}")]
    Status(u16),

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
}

/// A text-completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Produce a completion for `prompt`. An empty `Ok` is a valid
    /// response; failures are reported through [`CompletionError`].
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Run a completion with `timeout` applied on the engine side.
pub(crate) async fn complete_with_timeout(
    client: &dyn CompletionClient,
    prompt: &str,
    timeout: Duration,
) -> Result<String, CompletionError> {
    match tokio::time::timeout(timeout, client.complete(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(CompletionError::Timeout(timeout)),
    }
}

/// HTTP adapter for an Ollama-style chat endpoint: posts the prompt as a
/// single user message with streaming disabled and returns the reply text.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: ChatResponseMessage,
}

#[derive(Deserialize, Default)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

impl HttpCompletionClient {
    /// Create an adapter for the given chat endpoint and model.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()
            .map_err(|e| CompletionError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
        })
    }

    /// Override the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(COMPLETION_TIMEOUT)
                } else {
                    CompletionError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;
        Ok(parsed.message.content.trim().to_string())
    }
}
