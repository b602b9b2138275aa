mod conversation;
mod document;
mod embedding;
mod query;

pub use conversation::{render_transcript, Message, MessageRole};
pub use document::{sample_products, SearchResult, StoredDocument};
pub use embedding::Embedding;
pub use query::{ProcessingResponse, QueryJob, QueryResult, QueueStatus};
