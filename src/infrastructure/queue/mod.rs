//! In-process FIFO hand-off between request handlers and the query worker.
//!
//! The queue is unbounded and lives only in memory: there is no backpressure
//! and pending jobs are lost when the process exits.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{mpsc, Mutex};

use crate::domain::QueryJob;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, QueueError>;

pub struct QueryQueue {
    tx: mpsc::UnboundedSender<QueryJob>,
    rx: Mutex<mpsc::UnboundedReceiver<QueryJob>>,
    len: AtomicUsize,
    consumer: AtomicBool,
}

impl QueryQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            len: AtomicUsize::new(0),
            consumer: AtomicBool::new(false),
        }
    }

    /// Appends a job to the tail and returns the queue size after the append.
    pub fn enqueue(&self, job: QueryJob) -> Result<usize> {
        // Count before sending so a fast consumer never decrements below zero.
        let size = self.len.fetch_add(1, Ordering::SeqCst) + 1;
        if self.tx.send(job).is_err() {
            self.len.fetch_sub(1, Ordering::SeqCst);
            return Err(QueueError::Closed);
        }
        Ok(size)
    }

    /// Removes the head job, waiting while the queue is empty.
    ///
    /// Cancel safe: dropping the future before it resolves loses no job.
    pub async fn dequeue(&self) -> Option<QueryJob> {
        let job = self.rx.lock().await.recv().await;
        if job.is_some() {
            self.len.fetch_sub(1, Ordering::SeqCst);
        }
        job
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers the single consumer of this queue. Returns `false` when
    /// another consumer already holds the claim.
    pub fn claim_consumer(&self) -> bool {
        self.consumer
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn release_consumer(&self) {
        self.consumer.store(false, Ordering::SeqCst);
    }

    pub fn has_consumer(&self) -> bool {
        self.consumer.load(Ordering::SeqCst)
    }
}

impl Default for QueryQueue {
    fn default() -> Self {
        Self::new()
    }
}
