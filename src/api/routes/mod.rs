pub mod completion;
pub mod documents;
pub mod health;
pub mod query;

use axum::http::{header, Method, StatusCode};
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::middleware::request_logger;
use crate::api::state::{AppState, LlmState, RagState};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

/// Query API: accepts user queries and reports queue and collaborator state.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.cors.allowed_origins);

    Router::new()
        .route("/", get(query::root))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_v1_routes())
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::submit_query))
        .route("/health", get(health::health_check))
        .route("/queue-status", get(health::queue_status))
        .route("/system-info", get(health::system_info))
}

/// LLM proxy: completion endpoints in front of the model backend.
pub fn create_llm_router(state: LlmState) -> Router {
    let cors = build_cors(&state.config.cors.allowed_origins);

    let v1 = Router::new()
        .route("/completion", post(completion::create_completion))
        .route("/chat/completion", post(completion::create_chat_completion))
        .route("/health", get(completion::health_check))
        .route("/model/info", get(completion::model_info));

    Router::new()
        .nest("/api/v1", v1)
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Retrieval service: document ingestion and similarity search.
pub fn create_rag_router(state: RagState) -> Router {
    let cors = build_cors(&state.config.cors.allowed_origins);

    let v1 = Router::new()
        .route(
            "/documents",
            post(documents::add_documents).delete(documents::clear_documents),
        )
        .route("/documents/reload", post(documents::reload_documents))
        .route("/documents/count", get(documents::document_count))
        .route("/query", post(documents::query_documents))
        .route("/system-info", get(documents::system_info))
        .route("/health", get(documents::health_check));

    Router::new()
        .nest("/api/v1", v1)
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}
