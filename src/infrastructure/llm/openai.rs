use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;
use serde::Serialize;
use std::time::Duration;

use crate::domain::{
    ports::{CompletionRequest, LlmService},
    DomainError,
};
use crate::infrastructure::config::LlmConfig;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub context_window: u32,
}

/// Completion backend for the LLM proxy. Talks to any OpenAI-compatible
/// server (vLLM in deployment); `OPENAI_API_KEY` and `OPENAI_BASE_URL`
/// select the endpoint.
pub struct OpenAiCompatibleLlm {
    client: openai::Client,
    model: String,
    default_max_tokens: u32,
    default_temperature: f32,
    context_window: u32,
    timeout: Duration,
    api_base: String,
}

impl OpenAiCompatibleLlm {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            default_max_tokens: config.max_tokens,
            default_temperature: config.temperature,
            context_window: config.context_window,
            timeout: Duration::from_secs(config.timeout_seconds),
            api_base: std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            max_tokens: self.default_max_tokens,
            temperature: self.default_temperature,
            context_window: self.context_window,
        }
    }
}

#[async_trait]
impl LlmService for OpenAiCompatibleLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        let max_tokens = request.max_tokens.unwrap_or(self.default_max_tokens);
        let temperature = request.temperature.unwrap_or(self.default_temperature);

        let agent = self
            .client
            .agent(&self.model)
            .max_tokens(u64::from(max_tokens))
            .temperature(f64::from(temperature))
            .build();

        tokio::time::timeout(self.timeout, agent.prompt(request.prompt.as_str()))
            .await
            .map_err(|_| DomainError::timeout("LLM backend timed out"))?
            .map_err(|e| DomainError::external(format!("LLM backend failed: {e}")))
    }

    async fn health(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
