//! LLM provider trait for chat completions

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::types::ChatMessage;

/// One chat-completion call: `complete(model, messages, temperature)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Ordered role/content pairs
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
        }
    }
}

/// Trait for chat-completion backends
///
/// Implementations:
/// - `OpenAiClient`: any OpenAI-compatible `/chat/completions` endpoint
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion and return the reply text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
