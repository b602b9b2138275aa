mod openai;

pub use openai::{ModelInfo, OpenAiCompatibleLlm};
