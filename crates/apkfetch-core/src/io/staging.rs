//! Scratch area for candidate builds and promotion into the output tree.
//!
//! Backends always write candidates under the scratch directory. A candidate
//! that is accepted is moved to its destination with [`promote`]; everything
//! else is deleted, either one file at a time with [`discard`] or wholesale
//! when the scratch directory is wiped between packages.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Staging directory wiped before and after every package.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Removes anything left over and recreates an empty directory.
    pub async fn prepare(&self) -> std::io::Result<()> {
        self.clear().await?;
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Removes the directory and everything in it.
    pub async fn clear(&self) -> std::io::Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Whether the directory holds any entries.
    pub async fn is_empty(&self) -> std::io::Result<bool> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e),
        };
        Ok(entries.next_entry().await?.is_none())
    }
}

/// Moves an accepted candidate to `dest`, creating parent directories.
///
/// Falls back to copy-and-remove when a rename is not possible (scratch and
/// output on different file systems).
pub async fn promote(candidate: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    if tokio::fs::rename(candidate, dest).await.is_ok() {
        return Ok(());
    }

    tokio::fs::copy(candidate, dest).await?;
    tokio::fs::remove_file(candidate).await
}

/// Deletes a rejected candidate. A file that is already gone is not an error.
pub async fn discard(candidate: &Path) {
    match tokio::fs::remove_file(candidate).await {
        Err(e) if e.kind() != ErrorKind::NotFound => {
            tracing::warn!("Failed to delete rejected candidate {}: {e}", candidate.display());
        }
        _ => {}
    }
}
