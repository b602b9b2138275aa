pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use routes::{create_llm_router, create_rag_router, create_router};
pub use server::{cancel_on_signal, serve};
pub use state::{AppState, LlmState, RagState};
