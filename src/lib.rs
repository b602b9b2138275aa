//! Asynchronous product question answering.
//!
//! The `api` binary accepts queries, queues them and answers through a
//! webhook callback. Answers are built from documents served by the
//! `rag-service` binary and completions served by the `llm-service` binary.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod worker;

pub use worker::{QueryWorker, WorkerStatsSnapshot};
