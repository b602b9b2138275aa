//! Background consumer that drains the query queue.
//!
//! Exactly one consumer loop drains a queue at a time: the consumer claim
//! lives on the [`QueryQueue`] itself, so starting any worker built over the
//! same queue a second time leaves a single loop. Jobs are processed one at a time in FIFO order and each job
//! is attempted at most once.

use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::application::{CallbackDelivery, ChatOrchestrator, DeliveryOutcome};
use crate::domain::{QueryJob, QueueStatus};
use crate::infrastructure::QueryQueue;

#[derive(Debug, Default)]
pub struct WorkerStats {
    processed: AtomicU64,
    failed: AtomicU64,
    abandoned: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStatsSnapshot {
    pub processed: u64,
    pub failed: u64,
    pub abandoned: u64,
}

impl WorkerStats {
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone)]
pub struct QueryWorker {
    queue: Arc<QueryQueue>,
    orchestrator: Arc<ChatOrchestrator>,
    callback: Arc<CallbackDelivery>,
    stats: Arc<WorkerStats>,
}

/// Releases the queue's consumer claim however the loop ends.
struct RunningGuard(Arc<QueryQueue>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.release_consumer();
    }
}

impl QueryWorker {
    pub fn new(
        queue: Arc<QueryQueue>,
        orchestrator: Arc<ChatOrchestrator>,
        callback: Arc<CallbackDelivery>,
    ) -> Self {
        Self {
            queue,
            orchestrator,
            callback,
            stats: Arc::new(WorkerStats::default()),
        }
    }

    /// Spawns the consumer loop. Returns `None` when a loop is already
    /// draining this worker's queue.
    pub fn start(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.queue.claim_consumer() {
            warn!("query queue already has a consumer, ignoring start");
            return None;
        }

        let guard = RunningGuard(self.queue.clone());
        let worker = self.clone();
        Some(tokio::spawn(async move {
            let _guard = guard;
            worker.run(cancel).await;
        }))
    }

    pub fn is_running(&self) -> bool {
        self.queue.has_consumer()
    }

    pub fn queue_status(&self) -> QueueStatus {
        QueueStatus {
            queue_size: self.queue.len(),
            processor_running: self.is_running(),
        }
    }

    pub fn stats(&self) -> WorkerStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn queue(&self) -> &Arc<QueryQueue> {
        &self.queue
    }

    async fn run(&self, cancel: CancellationToken) {
        info!("query worker started");

        loop {
            let job = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                job = self.queue.dequeue() => job,
            };
            let Some(job) = job else {
                warn!("query queue closed");
                break;
            };

            let user_id = job.user_id.clone();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.stats.abandoned.fetch_add(1, Ordering::Relaxed);
                    warn!(user_id, "shutdown while processing, job abandoned");
                    break;
                }
                outcome = AssertUnwindSafe(self.process(job)).catch_unwind() => match outcome {
                    Ok(delivery) => {
                        self.stats.processed.fetch_add(1, Ordering::Relaxed);
                        info!(
                            user_id,
                            ?delivery,
                            queue_size = self.queue.len(),
                            "job complete"
                        );
                    }
                    Err(panic) => {
                        self.stats.failed.fetch_add(1, Ordering::Relaxed);
                        error!(user_id, panic = panic_message(&*panic), "job panicked, dropped");
                    }
                },
            }
        }

        info!("query worker stopped");
    }

    async fn process(&self, job: QueryJob) -> DeliveryOutcome {
        let answer = self
            .orchestrator
            .process_query(&job.user_id, &job.query)
            .await;
        self.callback.deliver(&job.user_id, &answer).await
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::RetryPolicy;
    use crate::domain::{
        ports::{CallbackSink, Responder, Retriever},
        DomainError, QueryResult,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FixedRetriever;

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<String>, DomainError> {
            Ok(vec!["Pixel 8 Pro: AI-powered smartphone".to_string()])
        }
    }

    /// Echoes the query, panics on "boom" and never finishes on "slow".
    struct ScriptedResponder;

    #[async_trait]
    impl Responder for ScriptedResponder {
        async fn respond(&self, query: &str, _documents: &[String]) -> Result<String, DomainError> {
            match query {
                "boom" => panic!("responder exploded"),
                "slow" => std::future::pending().await,
                other => Ok(format!("answer to {other}")),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<QueryResult>>,
    }

    impl RecordingSink {
        fn user_ids(&self) -> Vec<String> {
            self.delivered
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.user_id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl CallbackSink for RecordingSink {
        async fn send(&self, payload: &QueryResult) -> Result<(), DomainError> {
            self.delivered.lock().unwrap().push(payload.clone());
            Ok(())
        }

        fn destination(&self) -> &str {
            "memory://test"
        }
    }

    fn worker() -> (QueryWorker, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let orchestrator = ChatOrchestrator::new(Arc::new(FixedRetriever), Arc::new(ScriptedResponder));
        let callback = CallbackDelivery::new(
            Some(sink.clone() as Arc<dyn CallbackSink>),
            RetryPolicy::new(1, Duration::ZERO),
        );
        let worker = QueryWorker::new(
            Arc::new(QueryQueue::new()),
            Arc::new(orchestrator),
            Arc::new(callback),
        );
        (worker, sink)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    fn enqueue(worker: &QueryWorker, user_id: &str, query: &str) {
        worker.queue().enqueue(QueryJob::new(user_id, query)).unwrap();
    }

    #[tokio::test]
    async fn test_processes_jobs_in_fifo_order() {
        let (worker, sink) = worker();
        for user in ["a", "b", "c"] {
            enqueue(&worker, user, "tell me about phones");
        }

        let cancel = CancellationToken::new();
        let handle = worker.start(cancel.clone()).unwrap();

        wait_until(|| sink.user_ids().len() == 3).await;
        assert_eq!(sink.user_ids(), vec!["a", "b", "c"]);
        assert_eq!(worker.stats().processed, 3);
        assert!(worker.queue().is_empty());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_second_start_is_ignored() {
        let (worker, _sink) = worker();
        let cancel = CancellationToken::new();

        let handle = worker.start(cancel.clone()).unwrap();
        assert!(worker.is_running());
        assert!(worker.start(cancel.clone()).is_none());
        assert!(worker.clone().start(cancel.clone()).is_none());

        cancel.cancel();
        handle.await.unwrap();
        assert!(!worker.is_running());

        let restarted = CancellationToken::new();
        let handle = worker.start(restarted.clone()).unwrap();
        restarted.cancel();
        handle.await.unwrap();
    }

    /// Records the highest number of responses in progress at once.
    #[derive(Default)]
    struct ConcurrencyTracker {
        in_flight: AtomicU64,
        peak: AtomicU64,
    }

    #[async_trait]
    impl Responder for ConcurrencyTracker {
        async fn respond(&self, query: &str, _documents: &[String]) -> Result<String, DomainError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("answer to {query}"))
        }
    }

    #[tokio::test]
    async fn test_workers_sharing_a_queue_run_one_consumer() {
        let queue = Arc::new(QueryQueue::new());
        let tracker = Arc::new(ConcurrencyTracker::default());
        let sink = Arc::new(RecordingSink::default());
        let build = || {
            QueryWorker::new(
                queue.clone(),
                Arc::new(ChatOrchestrator::new(Arc::new(FixedRetriever), tracker.clone())),
                Arc::new(CallbackDelivery::new(
                    Some(sink.clone() as Arc<dyn CallbackSink>),
                    RetryPolicy::new(1, Duration::ZERO),
                )),
            )
        };
        let first = build();
        let second = build();

        let cancel = CancellationToken::new();
        let handle = first.start(cancel.clone()).unwrap();
        assert!(second.start(cancel.clone()).is_none());
        assert!(second.is_running());

        for user in ["a", "b", "c", "d"] {
            queue.enqueue(QueryJob::new(user, "tell me about phones")).unwrap();
        }
        wait_until(|| sink.user_ids().len() == 4).await;

        assert_eq!(tracker.peak.load(Ordering::SeqCst), 1);
        assert_eq!(sink.user_ids(), vec!["a", "b", "c", "d"]);

        cancel.cancel();
        handle.await.unwrap();
        assert!(!second.is_running());
        let restarted = CancellationToken::new();
        let handle = second.start(restarted.clone()).unwrap();
        restarted.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_stop_the_loop() {
        let (worker, sink) = worker();
        enqueue(&worker, "u1", "boom");
        enqueue(&worker, "u2", "tell me about phones");

        let cancel = CancellationToken::new();
        let handle = worker.start(cancel.clone()).unwrap();

        wait_until(|| sink.user_ids() == vec!["u2"]).await;
        let stats = worker.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.processed, 1);
        assert!(worker.is_running());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_abandons_in_flight_job() {
        let (worker, sink) = worker();
        enqueue(&worker, "u1", "slow");

        let cancel = CancellationToken::new();
        let handle = worker.start(cancel.clone()).unwrap();

        wait_until(|| worker.queue().is_empty()).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(worker.stats().abandoned, 1);
        assert!(sink.user_ids().is_empty());
        assert!(!worker.is_running());
    }

    #[tokio::test]
    async fn test_cancel_while_idle() {
        let (worker, _sink) = worker();
        let cancel = CancellationToken::new();
        let handle = worker.start(cancel.clone()).unwrap();

        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(worker.stats(), WorkerStatsSnapshot::default());
        assert!(!worker.is_running());
    }
}
