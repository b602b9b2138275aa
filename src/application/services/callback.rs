use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::domain::{ports::CallbackSink, QueryResult};
use crate::infrastructure::config::CallbackConfig;

/// Bounded retry with exponential backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay to wait after the given failed attempt (1-based), or `None`
    /// after the final attempt.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 1u32 << (attempt.saturating_sub(1)).min(16);
        Some(self.base_delay.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

impl From<&CallbackConfig> for RetryPolicy {
    fn from(config: &CallbackConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// No destination configured.
    Skipped,
    Delivered { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Best-effort delivery of answers to the external webhook.
pub struct CallbackDelivery {
    sink: Option<Arc<dyn CallbackSink>>,
    policy: RetryPolicy,
}

impl CallbackDelivery {
    pub fn new(sink: Option<Arc<dyn CallbackSink>>, policy: RetryPolicy) -> Self {
        Self { sink, policy }
    }

    pub fn disabled() -> Self {
        Self::new(None, RetryPolicy::default())
    }

    pub fn destination(&self) -> Option<&str> {
        self.sink.as_deref().map(|s| s.destination())
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Never fails. Exhausting every attempt is logged and the answer dropped.
    #[instrument(skip(self, answer))]
    pub async fn deliver(&self, user_id: &str, answer: &str) -> DeliveryOutcome {
        let Some(sink) = &self.sink else {
            tracing::warn!(answer, "no callback URL configured, dropping response");
            return DeliveryOutcome::Skipped;
        };

        let payload = QueryResult::new(user_id, answer);

        for attempt in 1..=self.policy.max_attempts {
            tracing::info!(attempt, destination = sink.destination(), "sending callback");

            match sink.send(&payload).await {
                Ok(()) => {
                    tracing::info!(attempt, "callback delivered");
                    return DeliveryOutcome::Delivered { attempts: attempt };
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "callback attempt failed");
                }
            }

            if let Some(delay) = self.policy.delay_after(attempt) {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!(
            attempts = self.policy.max_attempts,
            "failed to send callback after all attempts"
        );
        DeliveryOutcome::Exhausted {
            attempts: self.policy.max_attempts,
        }
    }
}
