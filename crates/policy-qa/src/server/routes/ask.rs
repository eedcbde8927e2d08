//! Question endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AskRequest, AskResponse};

/// POST /api/sessions/:id/ask - Ask one question about the session document
///
/// Model failures still answer 200: the error is part of the transcript and
/// flagged with `is_error`.
pub async fn ask_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let session = state.session(&id)?;
    let mut session = session.lock().await;

    tracing::info!("Session {}: question \"{}\"", id, request.question);
    let response = session.ask(&request.question).await?;

    tracing::info!(
        "Session {}: answered in {}ms ({} chunks, fallback: {}, error: {})",
        id,
        response.processing_time_ms,
        response.selected_chunks.len(),
        response.used_fallback,
        response.is_error
    );

    Ok(Json(response))
}
