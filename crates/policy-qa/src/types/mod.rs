//! Core types for the policy assistant

pub mod document;
pub mod message;
pub mod response;

pub use document::ProcessedDocument;
pub use message::{ChatMessage, Role, Transcript, Turn};
pub use response::{AskRequest, AskResponse, DocumentSummary, SessionView, UploadResponse};
