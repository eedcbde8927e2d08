//! Error types for the policy assistant

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Policy assistant errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// The document parsed but yielded no text layer
    #[error("Could not extract text from '{0}'. Please make sure it's a valid, text-based PDF.")]
    NoExtractableText(String),

    /// A question was asked before a document was processed
    #[error("No document has been processed yet. Please upload a policy PDF to continue.")]
    NoDocument,

    /// Blank question
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// Chat-completion error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Malformed request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration error
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::Config(_) | Error::Toml(_) => (StatusCode::BAD_REQUEST, "config_error"),
            Error::FileParse { .. } => (StatusCode::BAD_REQUEST, "parse_error"),
            Error::NoExtractableText(_) => (StatusCode::UNPROCESSABLE_ENTITY, "extraction_failed"),
            Error::NoDocument => (StatusCode::CONFLICT, "no_document"),
            Error::EmptyQuestion | Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::Llm(_) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error"),
            Error::SessionNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: Error) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(Error::NoExtractableText("scan.pdf".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(Error::NoDocument), StatusCode::CONFLICT);
        assert_eq!(status_of(Error::EmptyQuestion), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::llm("timeout")), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_of(Error::SessionNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(Error::config("no key")), StatusCode::BAD_REQUEST);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(status_of(io.into()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_toml_errors_convert() {
        let parsed: std::result::Result<crate::config::AppConfig, _> = toml::from_str("[server");
        let error: Error = parsed.unwrap_err().into();
        assert!(matches!(error, Error::Toml(_)));
        assert_eq!(status_of(error), StatusCode::BAD_REQUEST);
    }
}
