use std::path::PathBuf;
use thiserror::Error;

/// One variant per step of the report pipeline.
#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unable to create a temporary directory in {parent}. {error:?}")]
    DirectoryCreationError {
        parent: PathBuf,
        error: std::io::Error,
    },
    #[error("Unable to write reports to {directory}. {reason}")]
    ReportConfigurationError { directory: PathBuf, reason: String },
    #[error("Unable to write diagnostic report {path}. {error:?}")]
    ReportGenerationError {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Unable to create archive {file}. {error:?}")]
    ArchiveCreationError {
        file: PathBuf,
        error: std::io::Error,
    },
}
