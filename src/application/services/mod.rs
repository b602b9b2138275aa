mod callback;
mod orchestrator;
mod rag;
mod responder;
mod retriever;

pub use callback::{CallbackDelivery, DeliveryOutcome, RetryPolicy};
pub use orchestrator::{ChatOrchestrator, APOLOGY_MESSAGE};
pub use rag::{RagInfo, RagService};
pub use responder::{
    select_strategy, ResponderAgent, ResponseStrategy, COULDNT_FORMAT_MESSAGE,
    COULDNT_GENERATE_MESSAGE, NO_INFORMATION_MESSAGE, PRICING_MESSAGE,
};
pub use retriever::RetrieverAgent;
