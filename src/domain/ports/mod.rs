mod agents;
mod callback;
mod embedding;
mod llm;
mod retrieval;
mod vector_store;

pub use agents::{Responder, Retriever};
pub use callback::CallbackSink;
pub use embedding::EmbeddingService;
pub use llm::{CompletionRequest, LlmService};
pub use retrieval::DocumentRetriever;
pub use vector_store::VectorStore;
