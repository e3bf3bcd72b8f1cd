//! Document transformation routes
//!
//! Each endpoint resolves its named inputs from the caller's inbound
//! workspace, runs the codec work on the blocking pool, and publishes any
//! produced artifact into the outbound workspace. Nothing is written when an
//! operation fails.

use std::collections::BTreeMap;

use axum::{
    extract::{Extension, State},
    routing::post,
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::pdf::ops::{self, DocumentSummary};
use crate::session::SessionId;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metadata", post(read_metadata))
        .route("/write-metadata", post(write_metadata))
        .route("/merge", post(merge))
        .route("/split", post(split))
        .route("/encrypt", post(encrypt))
        .route("/decrypt", post(decrypt))
        .route("/extract-text", post(extract_text))
}

/// Run a codec operation on the blocking pool.
async fn run_codec<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> std::result::Result<T, crate::pdf::PdfError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("codec task failed: {e}")))?
        .map_err(AppError::from)
}

// ---------------------------------------------------------------------------
// read-metadata
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct MetadataRequest {
    filename: String,
}

#[derive(Serialize)]
struct MetadataResponse {
    success: bool,
    metadata: DocumentSummary,
}

async fn read_metadata(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<MetadataRequest>,
) -> Result<Json<MetadataResponse>> {
    let (name, bytes) = state
        .store()
        .read_document(&session, &request.filename)
        .await?;
    let metadata = run_codec(move || ops::read_metadata(&bytes)).await?;

    tracing::info!(session = %session, file = %name, "Metadata read");
    Ok(Json(MetadataResponse {
        success: true,
        metadata,
    }))
}

// ---------------------------------------------------------------------------
// write-metadata
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WriteMetadataRequest {
    filename: String,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ArtifactResponse {
    success: bool,
    filename: String,
    message: String,
}

async fn write_metadata(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<WriteMetadataRequest>,
) -> Result<Json<ArtifactResponse>> {
    let (source, bytes) = state
        .store()
        .read_document(&session, &request.filename)
        .await?;
    let metadata = request.metadata;
    let output = run_codec(move || ops::write_metadata(&bytes, &metadata)).await?;

    let artifact = ops::metadata_artifact_name(&source);
    state.store().publish(&session, &artifact, &output).await?;

    tracing::info!(session = %session, artifact = %artifact, "Metadata written");
    Ok(Json(ArtifactResponse {
        success: true,
        filename: artifact,
        message: "Metadata updated successfully".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// merge
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct MergeRequest {
    #[serde(default)]
    filenames: Vec<String>,
}

async fn merge(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<MergeRequest>,
) -> Result<Json<ArtifactResponse>> {
    if request.filenames.len() < 2 {
        return Err(AppError::Validation(
            "At least 2 files required for merging".to_string(),
        ));
    }

    // Inputs resolve in the given order; the first missing name aborts the
    // whole merge before anything is written.
    let mut inputs = Vec::with_capacity(request.filenames.len());
    for filename in &request.filenames {
        let (_, bytes) = state.store().read_document(&session, filename).await?;
        inputs.push(bytes);
    }
    let count = inputs.len();
    let output = run_codec(move || ops::merge(&inputs)).await?;

    let artifact = ops::merged_artifact_name(Local::now());
    state.store().publish(&session, &artifact, &output).await?;

    tracing::info!(session = %session, artifact = %artifact, count, "PDFs merged");
    Ok(Json(ArtifactResponse {
        success: true,
        filename: artifact,
        message: format!("Successfully merged {count} PDFs"),
    }))
}

// ---------------------------------------------------------------------------
// split
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SplitRequest {
    filename: String,
}

#[derive(Serialize)]
struct SplitResponse {
    success: bool,
    files: Vec<String>,
    message: String,
}

async fn split(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<SplitRequest>,
) -> Result<Json<SplitResponse>> {
    let (source, bytes) = state
        .store()
        .read_document(&session, &request.filename)
        .await?;
    let pages = run_codec(move || ops::split(&bytes)).await?;

    let mut artifacts = Vec::with_capacity(pages.len());
    for (index, output) in pages.iter().enumerate() {
        let artifact = ops::page_artifact_name(index as u32 + 1, &source);
        state.store().publish(&session, &artifact, output).await?;
        artifacts.push(artifact);
    }

    tracing::info!(session = %session, count = artifacts.len(), "PDF split");
    let message = format!("PDF split into {} pages", artifacts.len());
    Ok(Json(SplitResponse {
        success: true,
        files: artifacts,
        message,
    }))
}

// ---------------------------------------------------------------------------
// encrypt / decrypt
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PasswordRequest {
    filename: String,
    #[serde(default)]
    password: String,
}

async fn encrypt(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<PasswordRequest>,
) -> Result<Json<ArtifactResponse>> {
    if request.password.is_empty() {
        return Err(AppError::Validation(
            "Filename and password required".to_string(),
        ));
    }
    let (source, bytes) = state
        .store()
        .read_document(&session, &request.filename)
        .await?;
    let password = request.password.clone();
    let file_id = *uuid::Uuid::new_v4().as_bytes();
    let output = run_codec(move || ops::encrypt(&bytes, &password, file_id)).await?;

    let artifact = ops::encrypted_artifact_name(&source);
    state.store().publish(&session, &artifact, &output).await?;

    tracing::info!(session = %session, artifact = %artifact, "PDF encrypted");
    Ok(Json(ArtifactResponse {
        success: true,
        filename: artifact,
        message: "PDF encrypted successfully".to_string(),
    }))
}

async fn decrypt(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<PasswordRequest>,
) -> Result<Json<ArtifactResponse>> {
    if request.password.is_empty() {
        return Err(AppError::Validation(
            "Filename and password required".to_string(),
        ));
    }
    let (source, bytes) = state
        .store()
        .read_document(&session, &request.filename)
        .await?;
    let password = request.password.clone();
    let output = run_codec(move || ops::decrypt(&bytes, &password)).await?;

    let artifact = ops::decrypted_artifact_name(&source);
    state.store().publish(&session, &artifact, &output).await?;

    tracing::info!(session = %session, artifact = %artifact, "PDF decrypted");
    Ok(Json(ArtifactResponse {
        success: true,
        filename: artifact,
        message: "PDF decrypted successfully".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// extract-text
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ExtractTextRequest {
    filename: String,
    /// 0-based page indices; empty means every page
    #[serde(default)]
    pages: Vec<i64>,
}

#[derive(Serialize)]
struct ExtractTextResponse {
    success: bool,
    /// Keyed by 1-based page number
    text: BTreeMap<u32, String>,
    message: String,
}

async fn extract_text(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(request): Json<ExtractTextRequest>,
) -> Result<Json<ExtractTextResponse>> {
    let (_, bytes) = state
        .store()
        .read_document(&session, &request.filename)
        .await?;
    let pages = request.pages;
    let text = run_codec(move || ops::extract_text(&bytes, &pages)).await?;

    tracing::info!(session = %session, pages = text.len(), "Text extracted");
    let message = format!("Text extracted from {} pages", text.len());
    Ok(Json(ExtractTextResponse {
        success: true,
        text,
        message,
    }))
}
