//! Keyword chunk selection

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::ingestion::PARAGRAPH_SEPARATOR;
use crate::providers::{CompletionRequest, LlmProvider};

use super::keywords::parse_key_terms;

/// Chunks chosen for one question and the context built from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSelection {
    /// Positions of the chunks in `context`, ascending
    pub selected: Vec<usize>,
    /// No term matched and the leading chunks were used instead
    pub used_fallback: bool,
    /// Text passed to the answerer
    pub context: String,
}

/// Result of retrieval for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieval {
    /// Terms parsed from the model reply
    pub key_terms: Vec<String>,
    /// Selected chunks and context
    pub selection: ContextSelection,
}

/// Pick every chunk containing any term (case-insensitive substring, OR,
/// unranked). Matches are concatenated in order, each followed by a blank
/// line. Without any match, the first `fallback_chunks` chunks are joined
/// with blank lines instead, so the context is never empty for a non-empty
/// document.
pub fn select_context(terms: &[String], chunks: &[String], fallback_chunks: usize) -> ContextSelection {
    let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

    let mut selected = Vec::new();
    let mut context = String::new();

    for (index, chunk) in chunks.iter().enumerate() {
        let chunk_lower = chunk.to_lowercase();
        if terms.iter().any(|term| chunk_lower.contains(term.as_str())) {
            selected.push(index);
            context.push_str(chunk);
            context.push_str(PARAGRAPH_SEPARATOR);
        }
    }

    if !selected.is_empty() {
        return ContextSelection {
            selected,
            used_fallback: false,
            context,
        };
    }

    let take = fallback_chunks.min(chunks.len());
    ContextSelection {
        selected: (0..take).collect(),
        used_fallback: true,
        context: chunks[..take].join(PARAGRAPH_SEPARATOR),
    }
}

/// Asks the model for key terms and selects matching chunks
#[derive(Clone)]
pub struct Retriever {
    llm: Arc<dyn LlmProvider>,
    prompts: PromptBuilder,
    model: String,
    temperature: f32,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        prompts: PromptBuilder,
        model: impl Into<String>,
        temperature: f32,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            llm,
            prompts,
            model: model.into(),
            temperature,
            config,
        }
    }

    /// One completion call; errors propagate without retry
    pub async fn extract_key_terms(&self, question: &str) -> Result<Vec<String>> {
        let request = CompletionRequest::new(
            self.model.clone(),
            self.prompts.key_terms_messages(question),
            self.temperature,
        );

        let reply = self.llm.complete(&request).await?;
        let terms = parse_key_terms(&reply, self.config.min_term_length);
        tracing::debug!("Key terms for question: {:?}", terms);

        Ok(terms)
    }

    /// Key terms, then chunk selection
    pub async fn retrieve(&self, question: &str, chunks: &[String]) -> Result<Retrieval> {
        let key_terms = self.extract_key_terms(question).await?;
        let selection = select_context(&key_terms, chunks, self.config.fallback_chunks);

        if selection.used_fallback {
            tracing::info!(
                "No chunk matched {} key terms, using first {} chunks",
                key_terms.len(),
                selection.selected.len()
            );
        } else {
            tracing::info!(
                "Selected {}/{} chunks: {:?}",
                selection.selected.len(),
                chunks.len(),
                selection.selected
            );
        }

        Ok(Retrieval {
            key_terms,
            selection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_vacation_leave_scenario() {
        let chunks = strings(&["Annual leave policy...", "Office hours...", "Sick leave rules..."]);
        let terms = strings(&["vacation", "leave"]);

        let selection = select_context(&terms, &chunks, 3);

        assert_eq!(selection.selected, vec![0, 2]);
        assert!(!selection.used_fallback);
        assert_eq!(
            selection.context,
            "Annual leave policy...\n\nSick leave rules...\n\n"
        );
        assert!(!selection.context.contains("Office hours"));
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        let chunks = strings(&["PARENTAL LEAVE is granted", "Dress code"]);
        let selection = select_context(&strings(&["parent"]), &chunks, 3);
        assert_eq!(selection.selected, vec![0]);

        let selection = select_context(&strings(&["DRESS"]), &chunks, 3);
        assert_eq!(selection.selected, vec![1]);
    }

    #[test]
    fn test_fallback_uses_first_three_chunks() {
        let chunks = strings(&["one", "two", "three", "four", "five"]);
        let selection = select_context(&strings(&["pension"]), &chunks, 3);

        assert!(selection.used_fallback);
        assert_eq!(selection.selected, vec![0, 1, 2]);
        assert_eq!(selection.context, "one\n\ntwo\n\nthree");
    }

    #[test]
    fn test_fallback_with_fewer_chunks() {
        let chunks = strings(&["only"]);
        let selection = select_context(&[], &chunks, 3);
        assert!(selection.used_fallback);
        assert_eq!(selection.context, "only");
    }

    #[test]
    fn test_no_chunks_gives_empty_context() {
        let selection = select_context(&strings(&["leave"]), &[], 3);
        assert!(selection.used_fallback);
        assert!(selection.selected.is_empty());
        assert!(selection.context.is_empty());
    }
}
