use crate::domain::errors::DomainError;
use async_trait::async_trait;

/// Document-retrieval collaborator.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    /// Returns document texts in relevance order. `None` uses the collaborator's default `top_k`.
    async fn retrieve(&self, query: &str, top_k: Option<usize>)
        -> Result<Vec<String>, DomainError>;
    async fn document_count(&self) -> Result<u64, DomainError>;
}
