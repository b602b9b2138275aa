use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{DocumentRetriever, Retriever},
    DomainError,
};

/// Pass-through to the retrieval collaborator. Failures degrade to an empty
/// document list.
pub struct RetrieverAgent {
    retriever: Arc<dyn DocumentRetriever>,
    top_k: Option<usize>,
}

impl RetrieverAgent {
    pub fn new(retriever: Arc<dyn DocumentRetriever>) -> Self {
        Self {
            retriever,
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

#[async_trait]
impl Retriever for RetrieverAgent {
    #[instrument(skip(self))]
    async fn retrieve(&self, query: &str) -> Result<Vec<String>, DomainError> {
        match self.retriever.retrieve(query, self.top_k).await {
            Ok(documents) => {
                tracing::debug!(count = documents.len(), "retrieved documents");
                Ok(documents)
            }
            Err(e) => {
                tracing::error!(error = %e, "retrieval failed, continuing without documents");
                Ok(Vec::new())
            }
        }
    }
}
