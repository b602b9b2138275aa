use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use product_query_bot::api::{cancel_on_signal, create_router, serve, AppState};
use product_query_bot::application::{
    CallbackDelivery, ChatOrchestrator, ResponderAgent, RetrieverAgent, RetryPolicy,
};
use product_query_bot::domain::ports::{CallbackSink, DocumentRetriever, LlmService};
use product_query_bot::infrastructure::{
    telemetry, AppConfig, HttpCallbackSink, HttpLlmClient, HttpRagClient, QueryQueue,
    API_PORT_VAR,
};
use product_query_bot::QueryWorker;

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("api=debug,product_query_bot=debug,tower_http=info");
    let config = AppConfig::load_for(API_PORT_VAR)?;

    let services = &config.services;
    let llm: Arc<dyn LlmService> = Arc::new(HttpLlmClient::new(
        &services.llm_service_url,
        services.request_timeout(),
        services.health_timeout(),
    )?);
    let rag: Arc<dyn DocumentRetriever> = Arc::new(HttpRagClient::new(
        &services.rag_service_url,
        config.rag.top_k,
        services.request_timeout(),
        services.health_timeout(),
    )?);

    match llm.health().await {
        Ok(()) => info!(url = %services.llm_service_url, "LLM service reachable"),
        Err(e) => warn!(url = %services.llm_service_url, error = %e, "LLM service unreachable"),
    }
    match rag.document_count().await {
        Ok(count) => info!(url = %services.rag_service_url, document_count = count, "RAG service reachable"),
        Err(e) => warn!(url = %services.rag_service_url, error = %e, "RAG service unreachable"),
    }

    let orchestrator = ChatOrchestrator::new(
        Arc::new(RetrieverAgent::new(rag.clone()).with_top_k(config.rag.top_k)),
        Arc::new(ResponderAgent::new(llm.clone())),
    );

    let sink: Option<Arc<dyn CallbackSink>> = match &config.callback.url {
        Some(url) => Some(Arc::new(HttpCallbackSink::new(url, config.callback.timeout())?)),
        None => {
            warn!("no callback URL configured, answers will only be logged");
            None
        }
    };
    let callback = CallbackDelivery::new(sink, RetryPolicy::from(&config.callback));
    if let Some(destination) = callback.destination() {
        let policy = callback.policy();
        info!(
            destination,
            max_attempts = policy.max_attempts,
            base_delay_ms = policy.base_delay.as_millis() as u64,
            "callback delivery configured"
        );
    }

    let worker = QueryWorker::new(
        Arc::new(QueryQueue::new()),
        Arc::new(orchestrator),
        Arc::new(callback),
    );

    let shutdown = CancellationToken::new();
    cancel_on_signal(shutdown.clone());

    let worker_cancel = CancellationToken::new();
    let worker_handle = worker.start(worker_cancel.clone());

    let server = config.server.clone();
    let state = AppState::new(worker, llm, rag, config);
    let served = serve(create_router(state), &server, DEFAULT_PORT, shutdown).await;

    worker_cancel.cancel();
    if let Some(handle) = worker_handle {
        if let Err(e) = handle.await {
            warn!(error = %e, "query worker ended abnormally");
        }
    }

    served
}
