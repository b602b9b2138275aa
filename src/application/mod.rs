//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! implementations, so the query pipeline can run against HTTP
//! collaborators in production and in-process stubs in tests.

pub mod services;

pub use services::{
    CallbackDelivery, ChatOrchestrator, DeliveryOutcome, RagInfo, RagService, ResponderAgent,
    ResponseStrategy, RetrieverAgent, RetryPolicy,
};
