use crate::domain::{errors::DomainError, QueryResult};
use async_trait::async_trait;

/// Single delivery attempt of an answer to the external webhook.
///
/// Implementations return `Ok` only when the destination acknowledged the
/// payload with a success status.
#[async_trait]
pub trait CallbackSink: Send + Sync {
    async fn send(&self, payload: &QueryResult) -> Result<(), DomainError>;
    fn destination(&self) -> &str;
}
