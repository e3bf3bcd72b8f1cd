//! Upload and listing routes
//!
//! - `POST /upload` - multipart upload of a single PDF into the caller's
//!   inbound workspace
//! - `GET /list-files` - the caller's stored documents

use axum::{
    extract::{multipart::MultipartError, Extension, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::session::SessionId;
use crate::state::AppState;
use crate::storage::FileEntry;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/list-files", get(list_files))
}

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    filename: String,
    message: String,
}

async fn upload(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let max = state.config().storage.max_upload_bytes;

    let mut stored: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation("No file selected".to_string()))?;
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, max))?;

        stored = Some(state.store().store(&session, &filename, &bytes).await?);
        break;
    }

    let filename =
        stored.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    tracing::info!(session = %session, file = %filename, "File uploaded");

    Ok(Json(UploadResponse {
        success: true,
        filename,
        message: "File uploaded successfully".to_string(),
    }))
}

fn multipart_error(err: MultipartError, max: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { max }
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

#[derive(Serialize)]
struct ListResponse {
    success: bool,
    files: Vec<FileEntry>,
}

async fn list_files(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<ListResponse>> {
    let files = state.store().list(&session).await?;
    Ok(Json(ListResponse {
        success: true,
        files,
    }))
}
