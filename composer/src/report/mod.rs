mod archive;
mod cli;
mod command;
mod error;
mod generator;
mod temp_dir;

pub mod prelude {
    pub use super::archive::{ArchiveOptions, Archiver, MockArchiver, TarArchiver};
    pub use super::cli::{ReportArgs, report_root};
    pub use super::command::{ARCHIVE_EXTENSION, REPORT_PREFIX, ReportCommand, ReportOutcome, report_name};
    pub use super::error::ReportError;
    pub use super::generator::{
        DefaultReportGenerator, DiagnosticReport, MockReportGenerator, ReportGenerator,
        ReportHeader, ResourceLimit,
    };
    pub use super::temp_dir::{DefaultTempDirProvider, MockTempDirProvider, TempDirProvider};
}
