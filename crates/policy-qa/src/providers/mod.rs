//! Provider abstractions for chat completions
//!
//! The pipeline only depends on `LlmProvider`; the OpenAI-compatible client
//! is the production implementation and tests substitute scripted fakes.

pub mod llm;
pub mod openai;

pub use llm::{CompletionRequest, LlmProvider};
pub use openai::OpenAiClient;
