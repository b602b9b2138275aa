use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user query awaiting asynchronous processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryJob {
    pub user_id: String,
    pub query: String,
}

impl QueryJob {
    pub fn new(user_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            query: query.into(),
        }
    }
}

/// Payload posted to the callback destination once a job is answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub user_id: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

impl QueryResult {
    pub fn new(user_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResponse {
    pub message: String,
    pub status: String,
}

impl ProcessingResponse {
    pub fn accepted() -> Self {
        Self {
            message: "Query enqueued for processing".to_string(),
            status: "accepted".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub queue_size: usize,
    pub processor_running: bool,
}
