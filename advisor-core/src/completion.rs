use async_trait::async_trait;
use rig::{client::CompletionClient, completion::Chat, providers::openrouter};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AdvisorError, Result};

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// A prompt together with the JSON schema the answer must follow
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub schema: Value,
}

/// Remote text-completion endpoint
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends one request and returns the raw response text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// OpenRouter-backed completion through rig
pub struct RigBackend {
    api_key: String,
    model: String,
}

impl RigBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn agent(&self, schema: &Value) -> rig::agent::Agent<openrouter::CompletionModel> {
        let preamble = format!(
            "You are a Korean insurance market analyst.\n\
             Respond ONLY with JSON that conforms to the following JSON schema. \
             Do not mix text and JSON in your response.\n{schema}"
        );
        let client = openrouter::Client::new(&self.api_key);
        client.agent(&self.model).preamble(&preamble).build()
    }
}

#[async_trait]
impl CompletionBackend for RigBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        info!(model = %self.model, prompt_len = request.prompt.len(), "Sending completion request");

        let agent = self.agent(&request.schema);
        let raw = agent
            .chat(request.prompt.as_str(), vec![])
            .await
            .map_err(|e| AdvisorError::CompletionFailed(e.to_string()))?;

        debug!(response_len = raw.len(), "Completion received");
        Ok(raw)
    }
}

/// Backend used when no API key is configured; every call fails so callers fall back
pub struct OfflineBackend;

#[async_trait]
impl CompletionBackend for OfflineBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        Err(AdvisorError::CompletionFailed(
            "completion backend is not configured".to_string(),
        ))
    }
}

/// Strips Markdown code fences the model sometimes wraps JSON in
pub fn clean_json_response(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_prefix = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_prefix
        .strip_suffix("```")
        .unwrap_or(without_prefix)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_fences_are_removed() {
        assert_eq!(clean_json_response("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(clean_json_response("```\n[1,2]\n```"), "[1,2]");
        assert_eq!(clean_json_response("  {\"a\":1} "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn offline_backend_always_fails_without_quota_marker() {
        let request = CompletionRequest {
            prompt: "hello".to_string(),
            schema: Value::Null,
        };
        let err = OfflineBackend.complete(&request).await.unwrap_err();
        assert!(!err.is_quota());
    }
}
