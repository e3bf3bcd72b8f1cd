//! Session workspace manager
//!
//! Maps a [`SessionId`] to its pair of isolated directories: inbound for
//! uploaded documents, outbound for generated artifacts. Directories are
//! created lazily and only ever destroyed by the retention sweeper.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{AppError, Result};

use super::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceKind {
    /// Uploaded documents (`uploads/<session>`)
    Inbound,
    /// Generated artifacts (`outputs/<session>`)
    Outbound,
}

#[derive(Debug, Clone)]
pub struct Workspaces {
    uploads_root: PathBuf,
    outputs_root: PathBuf,
}

impl Workspaces {
    pub fn new(config: &Config) -> Self {
        Self {
            uploads_root: config.uploads_root(),
            outputs_root: config.outputs_root(),
        }
    }

    pub fn root(&self, kind: WorkspaceKind) -> &Path {
        match kind {
            WorkspaceKind::Inbound => &self.uploads_root,
            WorkspaceKind::Outbound => &self.outputs_root,
        }
    }

    /// Both base roots, for the sweeper.
    pub fn roots(&self) -> [&Path; 2] {
        [&self.uploads_root, &self.outputs_root]
    }

    /// The session's directory of the given kind, without creating it.
    pub fn dir(&self, session: &SessionId, kind: WorkspaceKind) -> PathBuf {
        self.root(kind).join(session.to_string())
    }

    /// The session's directory of the given kind, created if absent.
    /// Idempotent and safe under concurrent calls.
    pub async fn ensure(&self, session: &SessionId, kind: WorkspaceKind) -> Result<PathBuf> {
        let dir = self.dir(session, kind);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Storage(format!("failed to create workspace directory: {e}"))
        })?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspaces(tmp: &TempDir) -> Workspaces {
        let mut config = Config::default();
        config.storage.data_dir = tmp.path().to_path_buf();
        Workspaces::new(&config)
    }

    #[tokio::test]
    async fn distinct_sessions_get_distinct_dirs() {
        let tmp = TempDir::new().unwrap();
        let workspaces = workspaces(&tmp);
        let a = SessionId::new();
        let b = SessionId::new();

        let dir_a = workspaces.ensure(&a, WorkspaceKind::Inbound).await.unwrap();
        let dir_b = workspaces.ensure(&b, WorkspaceKind::Inbound).await.unwrap();

        assert_ne!(dir_a, dir_b);
        assert!(dir_a.is_dir());
        assert!(dir_b.is_dir());
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let workspaces = workspaces(&tmp);
        let session = SessionId::new();

        let first = workspaces
            .ensure(&session, WorkspaceKind::Outbound)
            .await
            .unwrap();
        let second = workspaces
            .ensure(&session, WorkspaceKind::Outbound)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn kinds_map_to_sibling_roots() {
        let tmp = TempDir::new().unwrap();
        let workspaces = workspaces(&tmp);
        let session = SessionId::new();

        let inbound = workspaces.dir(&session, WorkspaceKind::Inbound);
        let outbound = workspaces.dir(&session, WorkspaceKind::Outbound);
        assert!(inbound.starts_with(tmp.path().join("uploads")));
        assert!(outbound.starts_with(tmp.path().join("outputs")));
    }
}
