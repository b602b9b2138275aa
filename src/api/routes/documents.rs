use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{api_error, ApiError};
use crate::api::state::RagState;
use crate::application::RagInfo;
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
pub struct AddDocumentsRequest {
    pub documents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AddDocumentsResponse {
    pub message: String,
    pub node_ids: Vec<Uuid>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DocumentQueryRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub documents: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct SystemInfoResponse {
    pub status: String,
    pub info: RagInfo,
}

#[derive(Debug, Serialize)]
pub struct RagHealthResponse {
    pub status: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_count: Option<u64>,
    pub initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn internal(context: &'static str) -> impl FnOnce(DomainError) -> ApiError {
    move |e| {
        tracing::error!(error = %e, "{context}");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

pub async fn add_documents(
    State(state): State<RagState>,
    Json(request): Json<AddDocumentsRequest>,
) -> Result<Json<AddDocumentsResponse>, ApiError> {
    tracing::info!(count = request.documents.len(), "adding documents");

    let node_ids = state
        .rag
        .add_documents(&request.documents)
        .await
        .map_err(internal("Failed to add documents"))?;

    Ok(Json(AddDocumentsResponse {
        message: format!("Added {} documents", node_ids.len()),
        count: node_ids.len(),
        node_ids,
    }))
}

pub async fn reload_documents(
    State(state): State<RagState>,
) -> Result<Json<AddDocumentsResponse>, ApiError> {
    tracing::info!("reloading sample documents");

    let node_ids = state
        .rag
        .reload_samples()
        .await
        .map_err(internal("Failed to reload documents"))?;

    Ok(Json(AddDocumentsResponse {
        message: format!("Reloaded {} default documents", node_ids.len()),
        count: node_ids.len(),
        node_ids,
    }))
}

pub async fn query_documents(
    State(state): State<RagState>,
    Json(request): Json<DocumentQueryRequest>,
) -> Result<Json<DocumentsResponse>, ApiError> {
    tracing::debug!(query = %request.query, top_k = ?request.top_k, "querying documents");

    let documents = state
        .rag
        .query(&request.query, request.top_k)
        .await
        .map_err(internal("Failed to query documents"))?;

    Ok(Json(DocumentsResponse {
        count: documents.len(),
        documents,
    }))
}

pub async fn clear_documents(
    State(state): State<RagState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .rag
        .clear()
        .await
        .map_err(internal("Failed to clear documents"))?;

    Ok(Json(MessageResponse {
        message: "All documents cleared".into(),
    }))
}

pub async fn document_count(
    State(state): State<RagState>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state
        .rag
        .count()
        .await
        .map_err(internal("Failed to count documents"))?;

    Ok(Json(CountResponse { count }))
}

pub async fn system_info(
    State(state): State<RagState>,
) -> Result<Json<SystemInfoResponse>, ApiError> {
    let info = state
        .rag
        .info()
        .await
        .map_err(internal("Failed to read system info"))?;

    Ok(Json(SystemInfoResponse {
        status: "healthy".into(),
        info,
    }))
}

/// Always answers 200; an unreachable store is reported in the body.
pub async fn health_check(State(state): State<RagState>) -> Json<RagHealthResponse> {
    match state.rag.count().await {
        Ok(count) => Json(RagHealthResponse {
            status: "healthy".into(),
            service: "rag-service".into(),
            document_count: Some(count),
            initialized: true,
            error: None,
        }),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            Json(RagHealthResponse {
                status: "unhealthy".into(),
                service: "rag-service".into(),
                document_count: None,
                initialized: false,
                error: Some(e.to_string()),
            })
        }
    }
}
