use async_trait::async_trait;
use std::time::Duration;

use crate::domain::{ports::CallbackSink, DomainError, QueryResult};

/// Posts answers to the configured webhook URL.
pub struct HttpCallbackSink {
    http: reqwest::Client,
    url: String,
}

impl HttpCallbackSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CallbackSink for HttpCallbackSink {
    async fn send(&self, payload: &QueryResult) -> Result<(), DomainError> {
        let response = self.http.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DomainError::external(format!(
                "callback returned status {status}"
            )))
        }
    }

    fn destination(&self) -> &str {
        &self.url
    }
}
