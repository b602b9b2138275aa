use crate::domain::{errors::DomainError, Embedding, SearchResult, StoredDocument};
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, document: &StoredDocument, embedding: &Embedding)
        -> Result<(), DomainError>;
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;
    async fn clear(&self) -> Result<(), DomainError>;
    async fn count(&self) -> Result<u64, DomainError>;
    fn backend(&self) -> &'static str;
}
