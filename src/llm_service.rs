use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use product_query_bot::api::{cancel_on_signal, create_llm_router, serve, LlmState};
use product_query_bot::infrastructure::{
    telemetry, AppConfig, OpenAiCompatibleLlm, LLM_SERVICE_PORT_VAR,
};

const DEFAULT_PORT: u16 = 8001;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("llm_service=debug,product_query_bot=debug,tower_http=info");
    let config = AppConfig::load_for(LLM_SERVICE_PORT_VAR)?;

    let llm = OpenAiCompatibleLlm::from_config(&config.llm);
    let model_info = llm.model_info();
    info!(model = %model_info.model, api_base = %model_info.api_base, "LLM backend configured");

    let shutdown = CancellationToken::new();
    cancel_on_signal(shutdown.clone());

    let server = config.server.clone();
    let state = LlmState::new(Arc::new(llm), model_info, config);
    serve(create_llm_router(state), &server, DEFAULT_PORT, shutdown).await
}
