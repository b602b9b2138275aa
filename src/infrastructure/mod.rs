pub mod clients;
pub mod config;
pub mod embedding;
pub mod llm;
pub mod queue;
pub mod telemetry;
pub mod vector_store;

pub use clients::{HttpCallbackSink, HttpLlmClient, HttpRagClient};
pub use config::{
    AppConfig, ConfigError, API_PORT_VAR, LLM_SERVICE_PORT_VAR, RAG_SERVICE_PORT_VAR,
};
pub use embedding::TextEmbedding;
pub use llm::{ModelInfo, OpenAiCompatibleLlm};
pub use queue::{QueryQueue, QueueError};
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
