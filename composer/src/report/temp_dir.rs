use super::error::ReportError;
use mockall::automock;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Thin wrapper around the OS temp directory, so the report pipeline can be
/// tested without touching the filesystem.
#[automock]
pub trait TempDirProvider: Send + Sync {
    /// Root directory for ephemeral files.
    fn temp_root(&self) -> PathBuf;

    /// Create a new directory inside `parent`, named `prefix` followed by a
    /// random suffix. The directory is left on disk.
    fn create_dir(&self, parent: &Path, prefix: &str) -> Result<PathBuf, ReportError>;
}

#[derive(Debug, Default)]
pub struct DefaultTempDirProvider {}

impl TempDirProvider for DefaultTempDirProvider {
    fn temp_root(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn create_dir(&self, parent: &Path, prefix: &str) -> Result<PathBuf, ReportError> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)
            .map_err(|error| ReportError::DirectoryCreationError {
                parent: parent.to_path_buf(),
                error,
            })?
            .keep();

        debug!("Created temporary directory {}", dir.display());
        Ok(dir)
    }
}
