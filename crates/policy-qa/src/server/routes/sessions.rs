//! Session and document endpoints

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::session::DocumentLoad;
use crate::types::{DocumentSummary, SessionView, UploadResponse};

/// Fields read from an upload form
struct Upload {
    filename: String,
    data: Vec<u8>,
    api_key: Option<String>,
}

/// Read the `file` part and the optional `api_key` part
async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    let mut file = None;
    let mut api_key = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "api_key" => {
                let key = field.text().await.map_err(|e| {
                    Error::BadRequest(format!("Failed to read api_key: {}", e))
                })?;
                api_key = Some(key);
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "document.pdf".to_string());
                let data = field.bytes().await.map_err(|e| {
                    Error::BadRequest(format!("Failed to read file: {}", e))
                })?;
                file = Some((filename, data.to_vec()));
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let (filename, data) =
        file.ok_or_else(|| Error::BadRequest("Missing 'file' field with the policy PDF".into()))?;

    Ok(Upload {
        filename,
        data,
        api_key,
    })
}

fn upload_response(session_id: Uuid, load: DocumentLoad, document: DocumentSummary) -> UploadResponse {
    UploadResponse {
        session_id,
        cached: load == DocumentLoad::Cached,
        message: format!(
            "Document processed successfully! Extracted {} text segments. You can now ask questions.",
            document.total_chunks
        ),
        document,
    }
}

/// POST /api/sessions - Upload a policy PDF and open a session
pub async fn create_session(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let upload = read_upload(multipart).await?;
    let api_key = state.resolve_api_key(upload.api_key)?;

    tracing::info!("Processing upload: {} ({} bytes)", upload.filename, upload.data.len());

    let mut session = state.new_session(&api_key)?;
    let load = session.load_document(&upload.filename, upload.data).await?;
    let summary = session
        .document()
        .map(DocumentSummary::from)
        .ok_or_else(|| Error::internal("Document missing after processing"))?;

    let session_id = state.insert_session(session);
    Ok(Json(upload_response(session_id, load, summary)))
}

/// GET /api/sessions/:id - Document summary and transcript
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>> {
    let session = state.session(&id)?;
    let session = session.lock().await;
    Ok(Json(session.view()))
}

/// PUT /api/sessions/:id/document - Replace the session's document
pub async fn replace_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let upload = read_upload(multipart).await?;
    let session = state.session(&id)?;
    let mut session = session.lock().await;

    let load = session.load_document(&upload.filename, upload.data).await?;
    let summary = session
        .document()
        .map(DocumentSummary::from)
        .ok_or_else(|| Error::internal("Document missing after processing"))?;

    Ok(Json(upload_response(id, load, summary)))
}

/// DELETE /api/sessions/:id - Drop a session and its transcript
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    state.remove_session(&id)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "session_id": id,
    })))
}
