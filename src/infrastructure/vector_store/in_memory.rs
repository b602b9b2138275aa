use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, DomainError, Embedding, SearchResult, StoredDocument};

/// Cosine-similarity store kept in process memory. Used when no Qdrant URL
/// is configured.
pub struct InMemoryVectorStore {
    documents: RwLock<Vec<(StoredDocument, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        document: &StoredDocument,
        embedding: &Embedding,
    ) -> Result<(), DomainError> {
        let mut store = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|(d, _)| d.id != document.id);
        store.push((document.clone(), embedding.clone()));
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .map(|(document, embedding)| SearchResult {
                document: document.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        Ok(results)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .clear();
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let store = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(store.len() as u64)
    }

    fn backend(&self) -> &'static str {
        "in_memory"
    }
}
