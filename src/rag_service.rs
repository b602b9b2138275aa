use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use product_query_bot::api::{cancel_on_signal, create_rag_router, serve, RagState};
use product_query_bot::application::RagService;
use product_query_bot::domain::ports::VectorStore;
use product_query_bot::infrastructure::{
    telemetry, AppConfig, InMemoryVectorStore, QdrantVectorStore, TextEmbedding,
    RAG_SERVICE_PORT_VAR,
};

const DEFAULT_PORT: u16 = 8003;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("rag_service=debug,product_query_bot=debug,tower_http=info");
    let config = AppConfig::load_for(RAG_SERVICE_PORT_VAR)?;

    let rag_config = &config.rag;
    let vector_store: Arc<dyn VectorStore> = match &rag_config.qdrant_url {
        Some(url) => {
            let store = QdrantVectorStore::new(
                url,
                &rag_config.collection,
                rag_config.embedding_dimension,
            )
            .await?;
            info!(%url, collection = %rag_config.collection, "using Qdrant vector store");
            Arc::new(store)
        }
        None => {
            info!("using in-memory vector store");
            Arc::new(InMemoryVectorStore::new())
        }
    };
    let embedding = Arc::new(TextEmbedding::from_config(rag_config));

    let rag = Arc::new(RagService::new(
        embedding,
        vector_store,
        rag_config.top_k,
        rag_config.max_top_k,
    ));

    if rag_config.load_sample_data {
        match rag.seed_if_empty().await {
            Ok(0) => info!("document store already populated"),
            Ok(added) => info!(added, "loaded sample catalog"),
            Err(e) => warn!(error = %e, "failed to load sample catalog"),
        }
    }

    let shutdown = CancellationToken::new();
    cancel_on_signal(shutdown.clone());

    let server = config.server.clone();
    let state = RagState::new(rag, config);
    serve(create_rag_router(state), &server, DEFAULT_PORT, shutdown).await
}
