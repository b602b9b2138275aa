use crate::domain::errors::DomainError;
use async_trait::async_trait;

/// First orchestration stage: fetch supporting documents for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<String>, DomainError>;
}

/// Second orchestration stage: turn a query and its documents into an answer.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, query: &str, documents: &[String]) -> Result<String, DomainError>;
}
