use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;
use crate::domain::QueueStatus;
use crate::worker::WorkerStatsSnapshot;

#[derive(Debug, Serialize)]
pub struct CollaboratorStatus {
    pub llm_service: String,
    pub rag_service: String,
    pub document_count: Option<u64>,
}

impl CollaboratorStatus {
    fn all_healthy(&self) -> bool {
        self.llm_service == "healthy" && self.rag_service == "healthy"
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    #[serde(flatten)]
    pub queue: QueueStatus,
    pub callback_url: Option<String>,
    pub system: CollaboratorStatus,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub system: CollaboratorStatus,
}

#[derive(Debug, Serialize)]
pub struct QueueSettings {
    pub top_k: usize,
}

#[derive(Debug, Serialize)]
pub struct QueueStatusResponse {
    #[serde(flatten)]
    pub queue: QueueStatus,
    pub timestamp: DateTime<Utc>,
    pub callback_url: Option<String>,
    pub settings: QueueSettings,
}

#[derive(Debug, Serialize)]
pub struct ConfigurationInfo {
    pub llm_service_url: String,
    pub rag_service_url: String,
    pub top_k: usize,
    pub callback_url: Option<String>,
    pub callback_max_attempts: u32,
}

#[derive(Debug, Serialize)]
pub struct QueueInfo {
    pub size: usize,
    pub processor_running: bool,
    pub jobs: WorkerStatsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SystemInfoResponse {
    pub project: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub configuration: ConfigurationInfo,
    pub queue: QueueInfo,
    pub system_status: CollaboratorStatus,
}

async fn collaborator_status(state: &AppState) -> CollaboratorStatus {
    let (llm, documents) = tokio::join!(state.llm.health(), state.retriever.document_count());

    let llm_service = match llm {
        Ok(()) => "healthy".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "LLM service health check failed");
            "unhealthy".to_string()
        }
    };
    let (rag_service, document_count) = match documents {
        Ok(count) => ("healthy".to_string(), Some(count)),
        Err(e) => {
            tracing::warn!(error = %e, "RAG service health check failed");
            ("unhealthy".to_string(), None)
        }
    };

    CollaboratorStatus {
        llm_service,
        rag_service,
        document_count,
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let system = collaborator_status(&state).await;

    Json(HealthResponse {
        status: "healthy".into(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").into(),
        queue: state.worker.queue_status(),
        callback_url: state.callback_url().map(String::from),
        system,
    })
}

pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let system = collaborator_status(&state).await;

    if system.all_healthy() {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".into(),
                system,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready".into(),
                system,
            }),
        )
    }
}

pub async fn queue_status(State(state): State<AppState>) -> Json<QueueStatusResponse> {
    Json(QueueStatusResponse {
        queue: state.worker.queue_status(),
        timestamp: Utc::now(),
        callback_url: state.callback_url().map(String::from),
        settings: QueueSettings {
            top_k: state.config.rag.top_k,
        },
    })
}

pub async fn system_info(State(state): State<AppState>) -> Json<SystemInfoResponse> {
    let system_status = collaborator_status(&state).await;
    let config = &state.config;

    Json(SystemInfoResponse {
        project: config.project_name.clone(),
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: Utc::now(),
        configuration: ConfigurationInfo {
            llm_service_url: config.services.llm_service_url.clone(),
            rag_service_url: config.services.rag_service_url.clone(),
            top_k: config.rag.top_k,
            callback_url: config.callback.url.clone(),
            callback_max_attempts: config.callback.max_attempts,
        },
        queue: QueueInfo {
            size: state.queue.len(),
            processor_running: state.worker.is_running(),
            jobs: state.worker.stats(),
        },
        system_status,
    })
}
