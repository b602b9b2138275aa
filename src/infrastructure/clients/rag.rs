use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

use super::api_url;
use crate::domain::{ports::DocumentRetriever, DomainError};

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    document_count: u64,
}

/// Client for the `rag-service` retrieval endpoint.
pub struct HttpRagClient {
    http: reqwest::Client,
    base_url: String,
    default_top_k: usize,
    health_timeout: Duration,
}

impl HttpRagClient {
    pub fn new(
        base_url: impl Into<String>,
        default_top_k: usize,
        request_timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            default_top_k,
            health_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DocumentRetriever for HttpRagClient {
    #[instrument(skip(self))]
    async fn retrieve(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<String>, DomainError> {
        let response = self
            .http
            .post(api_url(&self.base_url, "query"))
            .json(&QueryRequest {
                query,
                top_k: top_k.unwrap_or(self.default_top_k),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::external(format!(
                "RAG service returned status {status}"
            )));
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.documents)
    }

    async fn document_count(&self) -> Result<u64, DomainError> {
        let response = self
            .http
            .get(api_url(&self.base_url, "health"))
            .timeout(self.health_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DomainError::unavailable(format!(
                "RAG service health check failed: {}",
                response.status()
            )));
        }

        let body: HealthResponse = response.json().await?;
        Ok(body.document_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: &str) -> HttpRagClient {
        HttpRagClient::new(url, 5, Duration::from_secs(5), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_uses_default_top_k_and_preserves_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/query")
            .match_body(Matcher::Json(json!({"query": "laptops", "top_k": 5})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"documents": ["Dell XPS 13: ultrabook", "MacBook Air M3: laptop"], "count": 2}"#)
            .create_async()
            .await;

        let docs = client(&server.url()).retrieve("laptops", None).await.unwrap();

        assert_eq!(docs, vec!["Dell XPS 13: ultrabook", "MacBook Air M3: laptop"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retrieve_explicit_top_k() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/query")
            .match_body(Matcher::PartialJson(json!({"top_k": 2})))
            .with_status(200)
            .with_body(r#"{"documents": []}"#)
            .create_async()
            .await;

        let docs = client(&server.url()).retrieve("phones", Some(2)).await.unwrap();

        assert!(docs.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retrieve_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/query")
            .with_status(503)
            .create_async()
            .await;

        let result = client(&server.url()).retrieve("phones", None).await;
        assert!(matches!(result, Err(DomainError::ExternalService(_))));
    }

    #[tokio::test]
    async fn test_document_count_from_health() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/health")
            .with_status(200)
            .with_body(r#"{"status": "healthy", "service": "rag-service", "document_count": 10}"#)
            .create_async()
            .await;

        assert_eq!(client(&server.url()).document_count().await.unwrap(), 10);
    }
}
