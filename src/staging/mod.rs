//! Staging of uploaded images before they are forwarded.
//!
//! An upload is written to a uniquely named file, handed to the job client,
//! and deleted once the request finishes. The `StagingStore` trait keeps the
//! storage mechanism swappable (temp directory in production, in-memory spies
//! in tests).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::constants::STAGED_FILE_PREFIX;
use crate::error::StagingError;
use crate::upload::UploadedImage;

/// Temporary handle to an uploaded image, owned by one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Location of the staged bytes
    pub path: PathBuf,
    /// Base name presented to the job API (original extension kept)
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Abstraction over where staged uploads live.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Persist an upload and return a handle to it.
    async fn stage(&self, image: &UploadedImage) -> Result<StagedFile, StagingError>;

    /// Delete a previously staged upload.
    async fn release(&self, staged: &StagedFile) -> Result<(), StagingError>;
}

/// Owns a staged upload until it is released.
///
/// `release` deletes the file through the store. If the guard is dropped
/// first (the request future was cancelled mid-poll), deletion is spawned
/// onto the current runtime instead.
pub struct StagedGuard {
    store: Arc<dyn StagingStore>,
    staged: Option<StagedFile>,
}

impl StagedGuard {
    pub fn new(store: Arc<dyn StagingStore>, staged: StagedFile) -> Self {
        Self {
            store,
            staged: Some(staged),
        }
    }

    pub async fn release(mut self) -> Result<(), StagingError> {
        match self.staged.take() {
            Some(staged) => self.store.release(&staged).await,
            None => Ok(()),
        }
    }
}

impl Drop for StagedGuard {
    fn drop(&mut self) {
        let Some(staged) = self.staged.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = Arc::clone(&self.store);
                handle.spawn(async move {
                    if let Err(e) = store.release(&staged).await {
                        tracing::warn!(
                            path = %staged.path.display(),
                            error = %e,
                            "Failed to delete abandoned staged upload"
                        );
                    } else {
                        tracing::debug!(
                            path = %staged.path.display(),
                            "Deleted abandoned staged upload"
                        );
                    }
                });
            }
            Err(_) => tracing::warn!(
                path = %staged.path.display(),
                "No runtime to delete abandoned staged upload"
            ),
        }
    }
}

/// Extension of the uploaded file name, including the dot (".png").
///
/// Only short alphanumeric extensions are kept so that client-supplied names
/// cannot influence the staged path beyond its suffix.
fn safe_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Stores uploads as files in a directory (the OS temp dir by default).
#[derive(Debug, Clone)]
pub struct TempDirStore {
    dir: PathBuf,
}

impl TempDirStore {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl StagingStore for TempDirStore {
    async fn stage(&self, image: &UploadedImage) -> Result<StagedFile, StagingError> {
        let suffix = safe_extension(image.file_name.as_deref());

        let file = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;

        // Take ownership of the path; deletion is handled by `release`
        let path = file.into_temp_path().keep().map_err(|e| e.error)?;

        if let Err(e) = tokio::fs::write(&path, &image.bytes).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(STAGED_FILE_PREFIX)
            .to_string();

        Ok(StagedFile {
            path,
            file_name,
            content_type: image.content_type.clone(),
            size: image.bytes.len(),
        })
    }

    async fn release(&self, staged: &StagedFile) -> Result<(), StagingError> {
        tokio::fs::remove_file(&staged.path).await?;
        Ok(())
    }
}
