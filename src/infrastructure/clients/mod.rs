//! HTTP adapters for the collaborators the query API talks to.

mod callback;
mod llm;
mod rag;

pub use callback::HttpCallbackSink;
pub use llm::HttpLlmClient;
pub use rag::HttpRagClient;

fn api_url(base_url: &str, path: &str) -> String {
    format!("{}/api/v1/{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_trims_trailing_slash() {
        assert_eq!(
            api_url("http://rag-service:8003/", "query"),
            "http://rag-service:8003/api/v1/query"
        );
        assert_eq!(
            api_url("http://llm-service:8001", "health"),
            "http://llm-service:8001/api/v1/health"
        );
    }
}
