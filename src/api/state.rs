use std::sync::Arc;

use crate::application::RagService;
use crate::domain::ports::{DocumentRetriever, LlmService};
use crate::infrastructure::{AppConfig, ModelInfo, QueryQueue};
use crate::worker::QueryWorker;

/// State for the query API.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<QueryQueue>,
    pub worker: QueryWorker,
    pub llm: Arc<dyn LlmService>,
    pub retriever: Arc<dyn DocumentRetriever>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        worker: QueryWorker,
        llm: Arc<dyn LlmService>,
        retriever: Arc<dyn DocumentRetriever>,
        config: AppConfig,
    ) -> Self {
        Self {
            queue: worker.queue().clone(),
            worker,
            llm,
            retriever,
            config: Arc::new(config),
        }
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.config.callback.url.as_deref()
    }
}

/// State for the LLM proxy.
#[derive(Clone)]
pub struct LlmState {
    pub llm: Arc<dyn LlmService>,
    pub model_info: ModelInfo,
    pub config: Arc<AppConfig>,
}

impl LlmState {
    pub fn new(llm: Arc<dyn LlmService>, model_info: ModelInfo, config: AppConfig) -> Self {
        Self {
            llm,
            model_info,
            config: Arc::new(config),
        }
    }
}

/// State for the retrieval service.
#[derive(Clone)]
pub struct RagState {
    pub rag: Arc<RagService>,
    pub config: Arc<AppConfig>,
}

impl RagState {
    pub fn new(rag: Arc<RagService>, config: AppConfig) -> Self {
        Self {
            rag,
            config: Arc::new(config),
        }
    }
}
