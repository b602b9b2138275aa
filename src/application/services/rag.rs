use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    ports::{DocumentRetriever, EmbeddingService, VectorStore},
    sample_products, DomainError, SearchResult, StoredDocument,
};

/// Texts this short are fragments, not products.
const MIN_DOCUMENT_CHARS: usize = 20;
/// Two texts sharing this many leading characters are the same product.
const DEDUP_PREFIX_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct RagInfo {
    pub backend: &'static str,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub top_k: usize,
    pub total_documents: u64,
}

/// Retrieval-service use cases: ingest, search and maintain the document store.
pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    default_top_k: usize,
    max_top_k: usize,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        default_top_k: usize,
        max_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            default_top_k,
            max_top_k,
        }
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn add_documents(&self, documents: &[String]) -> Result<Vec<Uuid>, DomainError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = documents.iter().map(String::as_str).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(DomainError::internal(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let mut ids = Vec::with_capacity(documents.len());
        for (content, embedding) in documents.iter().zip(&embeddings) {
            let document = StoredDocument::new(content.clone());
            self.vector_store.upsert(&document, embedding).await?;
            ids.push(document.id);
        }

        tracing::info!(added = ids.len(), "documents added");
        Ok(ids)
    }

    /// Returns up to `min(top_k, max_top_k)` distinct document texts in
    /// relevance order. A missing or zero `top_k` uses the default.
    #[instrument(skip(self))]
    pub async fn query(&self, query: &str, top_k: Option<usize>) -> Result<Vec<String>, DomainError> {
        let k = top_k
            .filter(|k| *k > 0)
            .unwrap_or(self.default_top_k)
            .min(self.max_top_k);
        if k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedding.embed(query).await?;
        // Over-fetch so deduplication can still fill k slots.
        let candidates = self.vector_store.search(&embedding, k * 2).await?;
        let documents = distinct_documents(candidates, k);

        tracing::debug!(returned = documents.len(), "query answered");
        Ok(documents)
    }

    pub async fn clear(&self) -> Result<(), DomainError> {
        self.vector_store.clear().await?;
        tracing::info!("document store cleared");
        Ok(())
    }

    pub async fn count(&self) -> Result<u64, DomainError> {
        self.vector_store.count().await
    }

    /// Replaces the store contents with the built-in sample catalog.
    pub async fn reload_samples(&self) -> Result<Vec<Uuid>, DomainError> {
        self.clear().await?;
        self.add_documents(&sample_products()).await
    }

    /// Loads the sample catalog when the store is empty. Returns how many
    /// documents were added.
    pub async fn seed_if_empty(&self) -> Result<usize, DomainError> {
        if self.count().await? > 0 {
            return Ok(0);
        }
        Ok(self.add_documents(&sample_products()).await?.len())
    }

    pub async fn info(&self) -> Result<RagInfo, DomainError> {
        Ok(RagInfo {
            backend: self.vector_store.backend(),
            embedding_model: self.embedding.model().to_string(),
            embedding_dimension: self.embedding.dimension(),
            top_k: self.default_top_k,
            total_documents: self.count().await?,
        })
    }
}

#[async_trait]
impl DocumentRetriever for RagService {
    async fn retrieve(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<String>, DomainError> {
        self.query(query, top_k).await
    }

    async fn document_count(&self) -> Result<u64, DomainError> {
        self.count().await
    }
}

fn distinct_documents(candidates: Vec<SearchResult>, k: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(k);

    for result in candidates {
        let text = result.document.content.trim();
        if text.chars().count() <= MIN_DOCUMENT_CHARS {
            continue;
        }

        let key: String = text
            .chars()
            .take(DEDUP_PREFIX_CHARS)
            .collect::<String>()
            .to_lowercase()
            .trim()
            .to_string();
        if !seen.insert(key) {
            continue;
        }

        documents.push(text.to_string());
        if documents.len() >= k {
            break;
        }
    }

    documents
}
