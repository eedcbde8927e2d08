//! Per-session state: the cached document and the chat transcript

use chrono::{DateTime, Utc};
use std::time::Instant;
use uuid::Uuid;

use crate::assistant::PolicyAssistant;
use crate::error::{Error, Result};
use crate::types::{AskResponse, ProcessedDocument, SessionView, Transcript};
use crate::types::response::DocumentSummary;

/// Outcome of handing a document to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentLoad {
    /// New bytes were extracted and chunked
    Processed,
    /// Identical bytes were already processed; the cache was reused
    Cached,
}

/// One user's conversation about one document.
///
/// Interactions on a session are processed one at a time; callers that
/// share a session across tasks wrap it in an async mutex.
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    assistant: PolicyAssistant,
    document: Option<ProcessedDocument>,
    transcript: Transcript,
}

impl Session {
    pub fn new(assistant: PolicyAssistant) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            assistant,
            document: None,
            transcript: Transcript::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document(&self) -> Option<&ProcessedDocument> {
        self.document.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Process `data` unless these exact bytes are already cached.
    ///
    /// Different bytes drop the previous document before extraction starts,
    /// so a failed upload leaves the session without a document rather
    /// than with stale chunks.
    pub async fn load_document(&mut self, filename: &str, data: Vec<u8>) -> Result<DocumentLoad> {
        if self.document.as_ref().is_some_and(|doc| doc.matches(&data)) {
            tracing::info!("Session {}: {} unchanged, reusing cached chunks", self.id, filename);
            return Ok(DocumentLoad::Cached);
        }

        if let Some(previous) = self.document.take() {
            tracing::info!("Session {}: replacing {}", self.id, previous.filename);
        }

        let document = self.assistant.ingest(filename, data).await?;
        self.document = Some(document);
        Ok(DocumentLoad::Processed)
    }

    /// Answer one question and record both turns.
    ///
    /// Model failures do not surface as `Err`: they are converted into an
    /// assistant turn carrying the error text, and the session stays usable.
    /// `Err` is returned only when the question cannot be asked at all
    /// (blank question, no document), in which case nothing is recorded.
    pub async fn ask(&mut self, question: &str) -> Result<AskResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::EmptyQuestion);
        }
        let chunks = match &self.document {
            Some(doc) if !doc.chunks.is_empty() => &doc.chunks,
            _ => return Err(Error::NoDocument),
        };

        let start = Instant::now();
        self.transcript.push_user(question);

        match self.assistant.respond(question, chunks).await {
            Ok(answer) => {
                let selection = answer.retrieval.selection;
                self.transcript.push_assistant(answer.text.clone());

                Ok(AskResponse {
                    answer: answer.text,
                    is_error: false,
                    key_terms: answer.retrieval.key_terms,
                    context_chars: selection.context.chars().count(),
                    selected_chunks: selection.selected,
                    used_fallback: selection.used_fallback,
                    processing_time_ms: start.elapsed().as_millis() as u64,
                })
            }
            Err(e) => {
                tracing::warn!("Session {}: question failed: {}", self.id, e);
                let message = format!(
                    "Sorry, I encountered an error while processing your question: {}",
                    e
                );
                self.transcript.push_error(message.clone());

                Ok(AskResponse::failed(message, start.elapsed().as_millis() as u64))
            }
        }
    }

    /// Snapshot for the HTTP API
    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            created_at: self.created_at,
            document: self.document.as_ref().map(DocumentSummary::from),
            transcript: self.transcript.turns().to_vec(),
        }
    }
}
