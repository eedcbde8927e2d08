//! Document ingestion: PDF text extraction and chunking

mod chunker;
mod parser;
mod processor;

pub use chunker::{tail_chars, TextChunker, PARAGRAPH_SEPARATOR};
pub use parser::{Extraction, LopdfBackend, PdfBackend, PdfExtractor};
pub use processor::IngestPipeline;
