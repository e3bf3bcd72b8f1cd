//! Retention sweeper
//!
//! Reclaims session workspaces whose last modification is older than the
//! retention window. Runs opportunistically from the landing route; there is
//! no timer, only an eventual-cleanup guarantee. A sweep never fails its
//! caller: per-entry problems are logged and skipped.

use std::path::Path;
use std::time::{Duration, SystemTime};

/// Remove every per-session directory under `roots` whose mtime is older
/// than `now - retention`. Returns the number of workspaces removed.
///
/// `now` is a parameter rather than read from the clock so retention
/// behavior is testable without touching file timestamps.
pub async fn sweep(roots: &[&Path], retention: Duration, now: SystemTime) -> usize {
    let Some(cutoff) = now.checked_sub(retention) else {
        return 0;
    };

    let mut removed = 0;
    for root in roots {
        let mut entries = match tokio::fs::read_dir(root).await {
            Ok(entries) => entries,
            // Root not created yet: nothing to sweep.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::warn!(root = %root.display(), "Failed to read workspace root: {}", e);
                continue;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(root = %root.display(), "Failed to list workspace root: {}", e);
                    break;
                }
            };

            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_dir() {
                continue;
            }
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            if modified >= cutoff {
                continue;
            }

            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => {
                    removed += 1;
                    tracing::info!(
                        workspace = %entry.path().display(),
                        "Reclaimed idle session workspace"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        workspace = %entry.path().display(),
                        "Failed to remove idle workspace: {}", e
                    );
                }
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RETENTION: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn removes_workspaces_past_the_window() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("uploads");
        let workspace = root.join("11111111-1111-1111-1111-111111111111");
        tokio::fs::create_dir_all(&workspace).await.unwrap();
        tokio::fs::write(workspace.join("doc.pdf"), b"x").await.unwrap();

        // From two hours in the future the fresh directory is past retention.
        let later = SystemTime::now() + Duration::from_secs(2 * 3600);
        let removed = sweep(&[root.as_path()], RETENTION, later).await;

        assert_eq!(removed, 1);
        assert!(!workspace.exists());
    }

    #[tokio::test]
    async fn keeps_workspaces_inside_the_window() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("uploads");
        let workspace = root.join("22222222-2222-2222-2222-222222222222");
        tokio::fs::create_dir_all(&workspace).await.unwrap();

        let soon = SystemTime::now() + Duration::from_secs(600);
        let removed = sweep(&[root.as_path()], RETENTION, soon).await;

        assert_eq!(removed, 0);
        assert!(workspace.exists());
    }

    #[tokio::test]
    async fn sweeping_a_missing_root_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("does-not-exist");
        assert_eq!(sweep(&[root.as_path()], RETENTION, SystemTime::now()).await, 0);
    }

    #[tokio::test]
    async fn repeated_sweeps_are_idempotent() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("outputs");
        let workspace = root.join("33333333-3333-3333-3333-333333333333");
        tokio::fs::create_dir_all(&workspace).await.unwrap();

        let later = SystemTime::now() + Duration::from_secs(2 * 3600);
        assert_eq!(sweep(&[root.as_path()], RETENTION, later).await, 1);
        assert_eq!(sweep(&[root.as_path()], RETENTION, later).await, 0);
    }

    #[tokio::test]
    async fn plain_files_under_a_root_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("uploads");
        tokio::fs::create_dir_all(&root).await.unwrap();
        tokio::fs::write(root.join("stray.txt"), b"x").await.unwrap();

        let later = SystemTime::now() + Duration::from_secs(2 * 3600);
        assert_eq!(sweep(&[root.as_path()], RETENTION, later).await, 0);
        assert!(root.join("stray.txt").exists());
    }
}
