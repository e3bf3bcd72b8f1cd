//! Document store
//!
//! Persists uploaded documents into a session's inbound directory and
//! published artifacts into its outbound directory. All writes go through a
//! temp-file-and-rename so a failed operation never leaves a partially
//! written file visible.

use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::session::{SessionId, WorkspaceKind, Workspaces};

use super::sanitize::sanitize;

/// A stored document as reported by `list`
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    workspaces: Workspaces,
    max_upload_bytes: u64,
}

impl DocumentStore {
    pub fn new(workspaces: Workspaces, max_upload_bytes: u64) -> Self {
        Self {
            workspaces,
            max_upload_bytes,
        }
    }

    /// Validate and persist an uploaded document, returning its safe name.
    /// Re-uploading the same name within a session overwrites.
    pub async fn store(
        &self,
        session: &SessionId,
        raw_filename: &str,
        bytes: &[u8],
    ) -> Result<String> {
        if raw_filename.trim().is_empty() {
            return Err(AppError::Validation("No file selected".to_string()));
        }
        let extension_ok = raw_filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !extension_ok {
            return Err(AppError::Validation(
                "Only PDF files are allowed".to_string(),
            ));
        }
        if bytes.len() as u64 > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge {
                max: self.max_upload_bytes,
            });
        }
        let safe_name = sanitize(raw_filename)
            .ok_or_else(|| AppError::Validation("Invalid filename".to_string()))?;

        let dir = self
            .workspaces
            .ensure(session, WorkspaceKind::Inbound)
            .await?;
        write_atomic(&dir, &safe_name, bytes).await?;
        Ok(safe_name)
    }

    /// List the PDF documents in the session's inbound directory.
    /// Order is filesystem-native.
    pub async fn list(&self, session: &SessionId) -> Result<Vec<FileEntry>> {
        let dir = self.workspaces.dir(session, WorkspaceKind::Inbound);
        let mut files = Vec::new();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            // No upload has created the workspace yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(AppError::Storage(e.to_string())),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
        {
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.to_ascii_lowercase().ends_with(".pdf") {
                continue;
            }
            files.push(FileEntry {
                name,
                size: metadata.len(),
            });
        }
        Ok(files)
    }

    /// Read a stored document from the session's inbound directory,
    /// returning its sanitized name alongside the bytes. Artifact names are
    /// always derived from the sanitized name, never the raw one.
    pub async fn read_document(
        &self,
        session: &SessionId,
        raw_name: &str,
    ) -> Result<(String, Vec<u8>)> {
        self.read_from(session, WorkspaceKind::Inbound, raw_name)
            .await
    }

    /// Read a generated artifact from the session's outbound directory,
    /// returning its resolved name alongside the bytes.
    pub async fn read_artifact(
        &self,
        session: &SessionId,
        raw_name: &str,
    ) -> Result<(String, Vec<u8>)> {
        self.read_from(session, WorkspaceKind::Outbound, raw_name)
            .await
    }

    /// Publish a generated artifact into the session's outbound directory.
    /// Same-name overwrite is accepted.
    pub async fn publish(&self, session: &SessionId, name: &str, bytes: &[u8]) -> Result<()> {
        let dir = self
            .workspaces
            .ensure(session, WorkspaceKind::Outbound)
            .await?;
        write_atomic(&dir, name, bytes).await
    }

    async fn read_from(
        &self,
        session: &SessionId,
        kind: WorkspaceKind,
        raw_name: &str,
    ) -> Result<(String, Vec<u8>)> {
        let safe_name = sanitize(raw_name)
            .ok_or_else(|| AppError::Validation("Invalid filename".to_string()))?;
        let path = self.workspaces.dir(session, kind).join(&safe_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok((safe_name, bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("File not found: {safe_name}")))
            }
            Err(e) => Err(AppError::Storage(e.to_string())),
        }
    }
}

/// Write into `dir/name` via a uniquely named temp file in the same
/// directory, renamed over the target once fully written.
async fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let tmp = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| AppError::Storage(format!("failed to write file: {e}")))?;
    if let Err(e) = tokio::fs::rename(&tmp, dir.join(name)).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(AppError::Storage(format!("failed to publish file: {e}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    const MAX: u64 = 1024;

    fn store(tmp: &TempDir) -> DocumentStore {
        let mut config = Config::default();
        config.storage.data_dir = tmp.path().to_path_buf();
        DocumentStore::new(Workspaces::new(&config), MAX)
    }

    #[tokio::test]
    async fn stores_and_reads_back() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();

        let name = store.store(&session, "report.pdf", b"%PDF-").await.unwrap();
        assert_eq!(name, "report.pdf");
        let (name, bytes) = store.read_document(&session, "report.pdf").await.unwrap();
        assert_eq!(name, "report.pdf");
        assert_eq!(bytes, b"%PDF-");
    }

    #[tokio::test]
    async fn rejects_non_pdf_extension() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();

        let err = store.store(&session, "notpdf.txt", b"x").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // Nothing was written.
        assert!(store.list(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn accepts_uppercase_extension() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();
        assert!(store.store(&session, "SCAN.PDF", b"x").await.is_ok());
    }

    #[tokio::test]
    async fn rejects_oversized_payloads() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();

        let big = vec![0u8; (MAX + 1) as usize];
        let err = store.store(&session, "big.pdf", &big).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge { .. }));
        assert!(store.list(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_filename() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();
        let err = store.store(&session, "  ", b"x").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn traversal_names_stay_inside_the_workspace() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();

        let name = store
            .store(&session, "../../escape.pdf", b"x")
            .await
            .unwrap();
        assert_eq!(name, "escape.pdf");
        assert!(!tmp.path().join("escape.pdf").exists());

        let listed = store.list(&session).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "escape.pdf");
    }

    #[tokio::test]
    async fn same_name_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();

        store.store(&session, "doc.pdf", b"first").await.unwrap();
        store.store(&session, "doc.pdf", b"second").await.unwrap();

        let (_, bytes) = store.read_document(&session, "doc.pdf").await.unwrap();
        assert_eq!(bytes, b"second");
        assert_eq!(store.list(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let a = SessionId::new();
        let b = SessionId::new();

        store.store(&a, "private.pdf", b"secret").await.unwrap();

        assert!(store.list(&b).await.unwrap().is_empty());
        let err = store.read_document(&b, "private.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();
        let err = store
            .read_document(&session, "ghost.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn artifacts_publish_and_resolve() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();

        store
            .publish(&session, "merged_x.pdf", b"artifact")
            .await
            .unwrap();
        let (name, bytes) = store.read_artifact(&session, "merged_x.pdf").await.unwrap();
        assert_eq!(name, "merged_x.pdf");
        assert_eq!(bytes, b"artifact");

        // Artifacts do not appear in the inbound listing.
        assert!(store.list(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn temp_files_are_not_listed() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let session = SessionId::new();

        store.store(&session, "doc.pdf", b"x").await.unwrap();
        let names: Vec<String> = store
            .list(&session)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["doc.pdf".to_string()]);
    }
}
