use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::{api_error, ApiError};
use crate::api::state::AppState;
use crate::domain::{ProcessingResponse, QueryJob};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub user_id: String,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}

pub async fn root(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {}", state.config.project_name),
        version: env!("CARGO_PKG_VERSION").into(),
        status: "running".into(),
    })
}

/// Validates and enqueues a query. The answer is delivered later through
/// the callback, never in this response.
pub async fn submit_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ProcessingResponse>, ApiError> {
    if request.user_id.trim().is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "user_id must not be empty",
        ));
    }
    if request.query.trim().is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "query must not be empty",
        ));
    }

    tracing::info!(user_id = %request.user_id, query = %request.query, "query received");

    let queue_size = state
        .queue
        .enqueue(QueryJob::new(request.user_id, request.query))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to enqueue query");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing request: {e}"),
            )
        })?;

    tracing::info!(queue_size, "query queued");
    Ok(Json(ProcessingResponse::accepted()))
}
