use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::{api_error, ApiError};
use crate::api::state::LlmState;
use crate::domain::{ports::CompletionRequest, render_transcript, Message};
use crate::infrastructure::ModelInfo;

#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub text: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct LlmHealthResponse {
    pub status: String,
    pub model_info: ModelInfo,
}

pub async fn create_completion(
    State(state): State<LlmState>,
    Json(request): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let preview: String = request.prompt.chars().take(100).collect();
    tracing::info!(prompt = %preview, "completion request");

    complete(&state, &request).await
}

pub async fn create_chat_completion(
    State(state): State<LlmState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    tracing::info!(messages = request.messages.len(), "chat completion request");
    if request.messages.is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "messages must not be empty",
        ));
    }

    let completion = CompletionRequest {
        prompt: render_transcript(&request.messages),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    };
    complete(&state, &completion).await
}

async fn complete(
    state: &LlmState,
    request: &CompletionRequest,
) -> Result<Json<CompletionResponse>, ApiError> {
    let text = state.llm.complete(request).await.map_err(|e| {
        tracing::error!(error = %e, "Completion failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(CompletionResponse {
        text,
        model: state.model_info.model.clone(),
    }))
}

pub async fn health_check(State(state): State<LlmState>) -> Json<LlmHealthResponse> {
    Json(LlmHealthResponse {
        status: "healthy".into(),
        model_info: state.model_info.clone(),
    })
}

pub async fn model_info(State(state): State<LlmState>) -> Json<ModelInfo> {
    Json(state.model_info.clone())
}
