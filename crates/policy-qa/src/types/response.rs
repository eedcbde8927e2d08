//! Request and response types for the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::ProcessedDocument;
use super::message::Turn;

/// Body of `POST /api/sessions/:id/ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// Natural-language question
    pub question: String,
}

/// Outcome of one question, successful or not
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Model answer, or the error message recorded in the transcript
    pub answer: String,
    /// True when the question failed and `answer` carries the error text
    pub is_error: bool,
    /// Key terms used for chunk selection
    pub key_terms: Vec<String>,
    /// Positions of the chunks sent as context
    pub selected_chunks: Vec<usize>,
    /// Whether the leading-chunks fallback was used
    pub used_fallback: bool,
    /// Length of the context in characters
    pub context_chars: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl AskResponse {
    /// A failed question; retrieval details are unknown
    pub fn failed(message: String, processing_time_ms: u64) -> Self {
        Self {
            answer: message,
            is_error: true,
            key_terms: Vec::new(),
            selected_chunks: Vec::new(),
            used_fallback: false,
            context_chars: 0,
            processing_time_ms,
        }
    }
}

/// Summary of a processed document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document ID
    pub id: Uuid,
    /// Filename
    pub filename: String,
    /// SHA-256 of the upload
    pub source_hash: String,
    /// File size in bytes
    pub file_size: u64,
    /// Pages visited by the parser
    pub total_pages: u32,
    /// Pages that produced text
    pub pages_with_text: u32,
    /// Extracted text length in characters
    pub text_chars: usize,
    /// Number of chunks created
    pub total_chunks: usize,
    /// Non-fatal extraction warning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Processing timestamp
    pub processed_at: DateTime<Utc>,
}

impl From<&ProcessedDocument> for DocumentSummary {
    fn from(doc: &ProcessedDocument) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            source_hash: doc.source_hash.clone(),
            file_size: doc.file_size,
            total_pages: doc.total_pages,
            pages_with_text: doc.pages_with_text,
            text_chars: doc.text.chars().count(),
            total_chunks: doc.chunks.len(),
            warning: doc.warning.clone(),
            processed_at: doc.processed_at,
        }
    }
}

/// Response to a document upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Session the document belongs to
    pub session_id: Uuid,
    /// True when identical bytes were already processed in this session
    pub cached: bool,
    /// Processed document
    pub document: DocumentSummary,
    /// Status banner
    pub message: String,
}

/// Session state as returned by `GET /api/sessions/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// Session ID
    pub session_id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Current document, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentSummary>,
    /// Transcript in order
    pub transcript: Vec<Turn>,
}
