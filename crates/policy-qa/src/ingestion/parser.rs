//! PDF text extraction

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Source of per-page text for a PDF on disk.
///
/// Implementations call `on_page` once per page in document order. An error
/// returned part-way through keeps whatever pages were already delivered.
pub trait PdfBackend: Send + Sync {
    fn extract_pages(&self, path: &Path, on_page: &mut dyn FnMut(u32, String)) -> Result<()>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Page-by-page extraction with `lopdf`
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    fn extract_pages(&self, path: &Path, on_page: &mut dyn FnMut(u32, String)) -> Result<()> {
        let filename = path.display().to_string();
        let doc = lopdf::Document::load(path)
            .map_err(|e| Error::file_parse(&filename, e.to_string()))?;

        // BTreeMap keyed by page number, so iteration is in document order
        for page_number in doc.get_pages().into_keys() {
            let text = doc.extract_text(&[page_number]).map_err(|e| {
                Error::file_parse(&filename, format!("page {}: {}", page_number, e))
            })?;
            on_page(page_number, text);
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}

/// Result of extracting one upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Page text, each contributing page followed by a newline
    pub text: String,
    /// Pages delivered by the backend
    pub pages_read: u32,
    /// Pages that contributed text
    pub pages_with_text: u32,
    /// Parser failure that cut extraction short
    pub warning: Option<String>,
}

impl Extraction {
    /// No usable text was found; the document must not be chunked
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Writes uploads to a scoped temporary file and collects their page text
#[derive(Clone)]
pub struct PdfExtractor {
    backend: Arc<dyn PdfBackend>,
}

impl PdfExtractor {
    pub fn new(backend: Arc<dyn PdfBackend>) -> Self {
        Self { backend }
    }

    /// Extract text from raw PDF bytes.
    ///
    /// Parser failures are not errors: they are logged, recorded in
    /// `Extraction::warning` and the text gathered so far is returned.
    /// Only failing to stage the temporary file is reported as `Err`.
    pub fn extract(&self, filename: &str, data: &[u8]) -> Result<Extraction> {
        let mut staged = tempfile::Builder::new()
            .prefix("policy-qa-")
            .suffix(".pdf")
            .tempfile()?;
        staged.write_all(data)?;
        staged.flush()?;

        let mut extraction = Extraction::default();
        let outcome = self.backend.extract_pages(staged.path(), &mut |page_number, text| {
            extraction.pages_read += 1;
            if text.trim().is_empty() {
                tracing::debug!("Page {} of {} has no text layer, skipping", page_number, filename);
                return;
            }
            extraction.pages_with_text += 1;
            extraction.text.push_str(&text);
            extraction.text.push('\n');
        });

        if let Err(e) = outcome {
            tracing::warn!(
                "Error extracting text from {} after {} page(s): {}",
                filename,
                extraction.pages_read,
                e
            );
            extraction.warning = Some(format!("Error extracting text: {}", e));
        }

        tracing::info!(
            "Extracted {} chars from {} ({}/{} pages with text, backend: {})",
            extraction.text.chars().count(),
            filename,
            extraction.pages_with_text,
            extraction.pages_read,
            self.backend.name()
        );

        // `staged` drops here and removes the temporary file on every path
        Ok(extraction)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(Arc::new(LopdfBackend))
    }
}
