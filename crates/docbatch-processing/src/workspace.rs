//! Request-scoped scratch directories (Workspace Manager + Reaper).
//!
//! Each batch gets `<root>/docbatch-<millis>-<random>/{input,output}`, backed by a
//! [`TempDir`] so the directory is removed even when the batch future is dropped.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use docbatch_core::{AppError, SourceDocument};
use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = "docbatch-";

#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    /// Create a fresh, empty input/output directory pair under `parent`.
    pub async fn allocate(parent: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::WorkspaceAllocation(format!(
                "cannot prepare workspace root {}: {}",
                parent.display(),
                e
            ))
        })?;

        let prefix = format!("{}{}-", WORKSPACE_PREFIX, Utc::now().timestamp_millis());
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(parent)
            .map_err(|e| {
                AppError::WorkspaceAllocation(format!(
                    "cannot create workspace in {}: {}",
                    parent.display(),
                    e
                ))
            })?;

        // `dir` removes itself if anything below fails.
        let workspace = Workspace {
            input_dir: dir.path().join("input"),
            output_dir: dir.path().join("output"),
            dir,
        };
        for sub in [&workspace.input_dir, &workspace.output_dir] {
            tokio::fs::create_dir(sub).await.map_err(|e| {
                AppError::WorkspaceAllocation(format!("cannot create {}: {}", sub.display(), e))
            })?;
        }

        tracing::debug!(workspace = %workspace.root().display(), "Allocated workspace");
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persist one source document into the input area.
    pub async fn write_input(&self, doc: &SourceDocument) -> Result<PathBuf, AppError> {
        let path = self.input_dir.join(&doc.filename);
        tokio::fs::write(&path, &doc.data)
            .await
            .map_err(|e| AppError::ConversionFailed {
                file: doc.filename.clone(),
                reason: format!("could not stage input: {}", e),
            })?;
        Ok(path)
    }

    /// Remove the whole workspace. Never fails; problems are logged.
    pub async fn reap(self) {
        let root = self.root().to_path_buf();
        let closed = tokio::task::spawn_blocking(move || self.dir.close()).await;

        match closed {
            Ok(Ok(())) => {
                tracing::debug!(workspace = %root.display(), "Reaped workspace");
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {}
            Ok(Err(e)) => {
                tracing::warn!(
                    workspace = %root.display(),
                    error = %e,
                    "Failed to remove workspace"
                );
            }
            Err(e) => {
                tracing::warn!(
                    workspace = %root.display(),
                    error = %e,
                    "Workspace removal task failed"
                );
            }
        }
    }
}
