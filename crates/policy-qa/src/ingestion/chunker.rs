//! Paragraph-accumulating text chunker with trailing-character overlap

/// Separator between paragraphs, both for splitting and when appending
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Text chunker with configurable size and overlap.
///
/// Sizes are counted in `char`s. `chunk_size` is a soft limit checked only
/// between paragraphs: a paragraph is never split, so a single oversized
/// paragraph produces an oversized chunk.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Trailing characters of a closed chunk that seed the next one
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into ordered, overlapping chunks
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut current_chunk = String::new();
        let mut current_len = 0usize;

        for paragraph in text.split(PARAGRAPH_SEPARATOR) {
            let paragraph_len = paragraph.chars().count();

            if current_len > 0 && current_len + paragraph_len > self.chunk_size {
                let carried = tail_chars(&current_chunk, self.overlap).to_string();
                chunks.push(std::mem::replace(&mut current_chunk, carried));
                current_len = current_len.min(self.overlap);
            }

            current_chunk.push_str(paragraph);
            current_chunk.push_str(PARAGRAPH_SEPARATOR);
            current_len += paragraph_len + PARAGRAPH_SEPARATOR.len();
        }

        if !current_chunk.is_empty() {
            chunks.push(current_chunk);
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

/// Last `n` chars of `text`, or all of it when shorter
pub fn tail_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}
