//! Ingestion pipeline orchestration

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::document::{hash_bytes, ProcessedDocument};

use super::chunker::TextChunker;
use super::parser::{PdfBackend, PdfExtractor};

/// Extract + chunk for one uploaded document
#[derive(Clone)]
pub struct IngestPipeline {
    /// PDF extractor
    extractor: PdfExtractor,
    /// Text chunker
    chunker: TextChunker,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline backed by `lopdf`
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            extractor: PdfExtractor::default(),
            chunker: TextChunker::new(config.chunk_size, config.chunk_overlap),
        }
    }

    /// Create a pipeline with a custom PDF backend
    pub fn with_backend(config: &ChunkingConfig, backend: Arc<dyn PdfBackend>) -> Self {
        Self {
            extractor: PdfExtractor::new(backend),
            chunker: TextChunker::new(config.chunk_size, config.chunk_overlap),
        }
    }

    /// Full ingestion: extract + chunk.
    ///
    /// Fails with `NoExtractableText` when the document yields no text; in
    /// that case nothing is chunked.
    pub fn ingest(&self, filename: &str, data: &[u8]) -> Result<ProcessedDocument> {
        let extraction = self.extractor.extract(filename, data)?;

        if extraction.is_empty() {
            return Err(Error::NoExtractableText(filename.to_string()));
        }

        let chunks = self.chunker.chunk(&extraction.text);
        tracing::info!(
            "Split {} into {} chunks (size {}, overlap {})",
            filename,
            chunks.len(),
            self.chunker.chunk_size(),
            self.chunker.overlap()
        );

        Ok(ProcessedDocument {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            source_hash: hash_bytes(data),
            file_size: data.len() as u64,
            total_pages: extraction.pages_read,
            pages_with_text: extraction.pages_with_text,
            text: extraction.text,
            chunks,
            warning: extraction.warning,
            processed_at: Utc::now(),
        })
    }
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self::new(&ChunkingConfig::default())
    }
}
