//! The processed form of an uploaded document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Extracted text and chunks derived from one uploaded PDF.
///
/// Chunks have no identity beyond their position in `chunks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Document ID
    pub id: Uuid,
    /// Original filename
    pub filename: String,
    /// SHA-256 of the uploaded bytes, used as the cache key
    pub source_hash: String,
    /// Size of the upload in bytes
    pub file_size: u64,
    /// Pages visited by the parser
    pub total_pages: u32,
    /// Pages that contributed text
    pub pages_with_text: u32,
    /// Concatenated page text
    pub text: String,
    /// Ordered, overlapping chunks of `text`
    pub chunks: Vec<String>,
    /// Non-fatal parser problem encountered during extraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Processing timestamp
    pub processed_at: DateTime<Utc>,
}

impl ProcessedDocument {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Whether this document was built from exactly these bytes
    pub fn matches(&self, data: &[u8]) -> bool {
        self.source_hash == hash_bytes(data)
    }
}

/// Hash content for cache keys
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
