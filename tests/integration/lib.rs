//! Shared helpers for the Recap integration tests.

use async_trait::async_trait;
use recap_engine::{CompletionClient, CompletionError};

/// Completion client that always fails, forcing every fallback path.
pub struct FailingClient;

#[async_trait]
impl CompletionClient for FailingClient {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Request("backend offline".to_string()))
    }
}

/// Completion client that answers the summary prompt with fixed text and
/// the extraction prompt with a JSON payload wrapped in prose.
pub struct ScriptedClient;

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        if prompt.starts_with("Update this conversation summary") {
            Ok("[Decision]: keep the v2 API. [Fact]: rollout is at 50%.".to_string())
        } else {
            Ok(concat!(
                "Sure, here it is:\n",
                "{\"decisions\": [\"Decision: Keep the v2 API\"], ",
                "\"constraints\": [\"Constraint: Must not break v1 clients\"]}"
            )
            .to_string())
        }
    }
}
