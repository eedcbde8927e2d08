//! Grounded answer generation

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{CompletionRequest, LlmProvider};

use super::prompt::PromptBuilder;

/// Sends the selected context and the question to the model
#[derive(Clone)]
pub struct Answerer {
    llm: Arc<dyn LlmProvider>,
    prompts: PromptBuilder,
    model: String,
    temperature: f32,
}

impl Answerer {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        prompts: PromptBuilder,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            llm,
            prompts,
            model: model.into(),
            temperature,
        }
    }

    /// One completion call; the reply is returned unmodified
    pub async fn answer(&self, question: &str, context: &str) -> Result<String> {
        let request = CompletionRequest::new(
            self.model.clone(),
            self.prompts.answer_messages(question, context),
            self.temperature,
        );

        tracing::info!(
            "Generating answer with {} ({} context chars)",
            self.model,
            context.chars().count()
        );

        self.llm.complete(&request).await
    }
}
