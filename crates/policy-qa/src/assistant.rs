//! The question-answering pipeline: ingest once, then retrieve + answer per question

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::generation::{Answerer, PromptBuilder};
use crate::ingestion::{IngestPipeline, LopdfBackend, PdfBackend};
use crate::providers::LlmProvider;
use crate::retrieval::{Retrieval, Retriever};
use crate::types::ProcessedDocument;

/// Model answer together with the retrieval that produced its context
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub retrieval: Retrieval,
}

/// Stateless pipeline shared by the CLI and the HTTP sessions
#[derive(Clone)]
pub struct PolicyAssistant {
    pipeline: Arc<IngestPipeline>,
    retriever: Retriever,
    answerer: Answerer,
}

impl PolicyAssistant {
    /// Create an assistant using the `lopdf` backend
    pub fn new(config: &AppConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self::with_backend(config, llm, Arc::new(LopdfBackend))
    }

    /// Create an assistant with a custom PDF backend
    pub fn with_backend(
        config: &AppConfig,
        llm: Arc<dyn LlmProvider>,
        backend: Arc<dyn PdfBackend>,
    ) -> Self {
        let prompts = PromptBuilder::new(config.assistant.organization.clone());

        Self {
            pipeline: Arc::new(IngestPipeline::with_backend(&config.chunking, backend)),
            retriever: Retriever::new(
                Arc::clone(&llm),
                prompts.clone(),
                config.llm.model.clone(),
                config.llm.temperature,
                config.retrieval.clone(),
            ),
            answerer: Answerer::new(
                llm,
                prompts,
                config.llm.model.clone(),
                config.llm.temperature,
            ),
        }
    }

    /// Extract and chunk a document off the async runtime
    pub async fn ingest(&self, filename: &str, data: Vec<u8>) -> Result<ProcessedDocument> {
        let pipeline = Arc::clone(&self.pipeline);
        let filename = filename.to_string();

        tokio::task::spawn_blocking(move || pipeline.ingest(&filename, &data))
            .await
            .map_err(|e| Error::internal(format!("Ingestion task failed: {}", e)))?
    }

    /// Retrieve context for `question` from `chunks`, then answer from it
    pub async fn respond(&self, question: &str, chunks: &[String]) -> Result<Answer> {
        if chunks.is_empty() {
            return Err(Error::NoDocument);
        }

        let retrieval = self.retriever.retrieve(question, chunks).await?;
        let text = self
            .answerer
            .answer(question, &retrieval.selection.context)
            .await?;

        Ok(Answer { text, retrieval })
    }
}
