//! policy-qa: ask questions about a single policy PDF
//!
//! A document is uploaded once per session: its text is extracted page by
//! page and split into overlapping chunks. Each question then runs two
//! chat-completion calls: one asks the model for key terms, which select
//! chunks by case-insensitive substring match, and one answers the question
//! using only the selected chunks as context.

pub mod assistant;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

pub use assistant::{Answer, PolicyAssistant};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use session::{DocumentLoad, Session};
pub use types::{
    document::ProcessedDocument,
    message::{ChatMessage, Role, Transcript, Turn},
    response::{AskRequest, AskResponse, DocumentSummary},
};
