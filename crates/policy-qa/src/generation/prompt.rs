//! Prompt templates for key-term extraction and grounded answering

use crate::types::ChatMessage;

/// Prompt builder for policy questions
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    /// Organization named in the instructions
    organization: String,
}

impl PromptBuilder {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }

    /// Messages asking the model for search terms. The question is the only
    /// user input.
    pub fn key_terms_messages(&self, question: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "The user is asking about a {org} HR policy. Extract 5-7 key terms from \
                 their question that would help find relevant information in an HR policy \
                 document.",
                org = self.organization
            )),
            ChatMessage::user(question),
        ]
    }

    /// Messages asking for an answer grounded only in `context`, which is
    /// embedded verbatim in the system instruction.
    pub fn answer_messages(&self, question: &str, context: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "You are a helpful assistant that answers questions about {org}'s HR policies \
                 based on the following information:\n\n{context}\n\nOnly use the information \
                 above. If the answer cannot be found in the provided information, say that you \
                 don't know.",
                org = self.organization,
                context = context
            )),
            ChatMessage::user(question),
        ]
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new("Nestlé")
    }
}
