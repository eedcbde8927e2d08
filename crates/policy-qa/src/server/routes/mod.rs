//! API routes for the policy server

pub mod ask;
pub mod sessions;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Uploads - with larger body limit for PDFs
        .route(
            "/sessions",
            post(sessions::create_session).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route(
            "/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/sessions/:id/document",
            put(sessions::replace_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Questions
        .route("/sessions/:id/ask", post(ask::ask_question))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "policy-qa",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Ask questions about an uploaded policy PDF",
        "endpoints": {
            "POST /api/sessions": "Upload a PDF (multipart 'file', optional 'api_key') and open a session",
            "GET /api/sessions/:id": "Session document and transcript",
            "PUT /api/sessions/:id/document": "Replace the session document",
            "POST /api/sessions/:id/ask": "Ask a question",
            "DELETE /api/sessions/:id": "Close a session"
        }
    }))
}
