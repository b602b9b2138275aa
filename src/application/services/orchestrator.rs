use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{Responder, Retriever},
    DomainError,
};

pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I encountered an error while processing your query. Please try again.";

/// Composes retrieval and response generation into one call that always
/// yields an answer.
pub struct ChatOrchestrator {
    retriever: Arc<dyn Retriever>,
    responder: Arc<dyn Responder>,
}

impl ChatOrchestrator {
    pub fn new(retriever: Arc<dyn Retriever>, responder: Arc<dyn Responder>) -> Self {
        Self {
            retriever,
            responder,
        }
    }

    /// Never fails: any stage error is logged and replaced by a fixed
    /// apology so the worker always has something to deliver.
    #[instrument(skip(self, query))]
    pub async fn process_query(&self, user_id: &str, query: &str) -> String {
        tracing::info!(query, "processing query");

        match self.run(query).await {
            Ok(answer) => {
                tracing::info!(answer_len = answer.len(), "query processed");
                answer
            }
            Err(e) => {
                tracing::error!(error = %e, "orchestration failed");
                APOLOGY_MESSAGE.to_string()
            }
        }
    }

    async fn run(&self, query: &str) -> Result<String, DomainError> {
        let documents = self.retriever.retrieve(query).await?;
        tracing::debug!(count = documents.len(), "documents retrieved");
        self.responder.respond(query, &documents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticRetriever(Result<Vec<String>, &'static str>);

    #[async_trait]
    impl Retriever for StaticRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<String>, DomainError> {
            self.0.clone().map_err(DomainError::external)
        }
    }

    #[derive(Default)]
    struct EchoResponder {
        seen: Mutex<Vec<(String, Vec<String>)>>,
        fail: bool,
    }

    #[async_trait]
    impl Responder for EchoResponder {
        async fn respond(&self, query: &str, documents: &[String]) -> Result<String, DomainError> {
            self.seen
                .lock()
                .unwrap()
                .push((query.to_string(), documents.to_vec()));
            if self.fail {
                return Err(DomainError::internal("responder broke"));
            }
            Ok(format!("{query}: {} docs", documents.len()))
        }
    }

    #[tokio::test]
    async fn test_passes_retrieved_documents_to_responder() {
        let responder = Arc::new(EchoResponder::default());
        let orchestrator = ChatOrchestrator::new(
            Arc::new(StaticRetriever(Ok(vec!["a: 1".into(), "b: 2".into()]))),
            responder.clone(),
        );

        let answer = orchestrator.process_query("u1", "phones").await;

        assert_eq!(answer, "phones: 2 docs");
        let seen = responder.seen.lock().unwrap();
        assert_eq!(seen[0].1, vec!["a: 1".to_string(), "b: 2".to_string()]);
    }

    #[tokio::test]
    async fn test_retrieval_error_becomes_apology() {
        let responder = Arc::new(EchoResponder::default());
        let orchestrator =
            ChatOrchestrator::new(Arc::new(StaticRetriever(Err("boom"))), responder.clone());

        assert_eq!(orchestrator.process_query("u1", "phones").await, APOLOGY_MESSAGE);
        assert!(responder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_responder_error_becomes_apology() {
        let orchestrator = ChatOrchestrator::new(
            Arc::new(StaticRetriever(Ok(vec!["a: 1".into()]))),
            Arc::new(EchoResponder {
                fail: true,
                ..Default::default()
            }),
        );

        assert_eq!(orchestrator.process_query("u1", "phones").await, APOLOGY_MESSAGE);
    }
}
