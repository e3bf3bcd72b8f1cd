//! Artifact delivery
//!
//! Serves generated artifacts from the caller's outbound workspace as
//! attachment downloads.

use axum::{
    body::Body,
    extract::{Extension, Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::session::SessionId;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/download/:filename", get(download))
}

async fn download(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let (name, bytes) = state.store().read_artifact(&session, &filename).await?;

    tracing::info!(session = %session, artifact = %name, "Artifact downloaded");
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type(&name))
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Content type from the file extension; artifacts are PDFs today, the
/// fallback keeps unknown names downloadable.
fn content_type(name: &str) -> &'static str {
    match name.rsplit('.').next().unwrap_or("") {
        ext if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_names_map_to_pdf_content_type() {
        assert_eq!(content_type("merged_x.pdf"), "application/pdf");
        assert_eq!(content_type("UPPER.PDF"), "application/pdf");
        assert_eq!(content_type("odd.bin"), "application/octet-stream");
    }
}
