use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use super::api_url;
use crate::domain::{
    ports::{CompletionRequest, LlmService},
    DomainError,
};

/// Completions shorter than this are treated as a failed generation.
const MIN_COMPLETION_CHARS: usize = 10;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    text: String,
}

/// Client for the `llm-service` completion proxy.
pub struct HttpLlmClient {
    http: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
}

impl HttpLlmClient {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            health_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LlmService for HttpLlmClient {
    #[instrument(skip(self, request), fields(prompt_len = request.prompt.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        let response = self
            .http
            .post(api_url(&self.base_url, "completion"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::external(format!(
                "LLM service returned status {status}"
            )));
        }

        let body: CompletionResponse = response.json().await?;
        let text = body.text.trim();
        if text.chars().count() < MIN_COMPLETION_CHARS {
            return Err(DomainError::external("LLM service returned an empty completion"));
        }

        Ok(text.to_string())
    }

    async fn health(&self) -> Result<(), DomainError> {
        let response = self
            .http
            .get(api_url(&self.base_url, "health"))
            .timeout(self.health_timeout)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(DomainError::unavailable(format!(
                "LLM service health check failed: {}",
                response.status()
            )))
        }
    }
}
