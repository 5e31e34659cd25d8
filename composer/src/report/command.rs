use super::archive::{ArchiveOptions, Archiver, TarArchiver};
use super::cli::ReportArgs;
use super::error::ReportError;
use super::generator::{DefaultReportGenerator, ReportGenerator};
use super::temp_dir::{DefaultTempDirProvider, TempDirProvider};
use chrono::{DateTime, Utc};
use colored::Colorize;
use educe::Educe;
use normpath::PathExt;
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Prefix shared by the temp directory, the archive and its top level entry.
pub const REPORT_PREFIX: &str = "composer-report-";
pub const ARCHIVE_EXTENSION: &str = "tgz";

/// `composer-report-<YYYYMMDDTHHMMSS>` for the given instant.
pub fn report_name(now: &DateTime<Utc>) -> String {
    format!("{}{}", REPORT_PREFIX, now.format("%Y%m%dT%H%M%S"))
}

fn with_trailing_separator(dir: &Path) -> PathBuf {
    let mut raw = dir.as_os_str().to_os_string();
    if !raw.to_string_lossy().ends_with(MAIN_SEPARATOR) {
        raw.push(MAIN_SEPARATOR_STR);
    }
    PathBuf::from(raw)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub temp_dir: PathBuf,
    pub diagnostic_report: PathBuf,
    pub output_file: PathBuf,
}

#[derive(Educe)]
#[educe(Debug)]
pub struct ReportCommand {
    /// Directory the archive is written to.
    pub output_dir: PathBuf,
    #[educe(Debug(ignore))]
    pub temp_dirs: Arc<dyn TempDirProvider>,
    #[educe(Debug(ignore))]
    pub generator: Box<dyn ReportGenerator>,
    #[educe(Debug(ignore))]
    pub archiver: Arc<dyn Archiver>,
}

impl ReportCommand {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            temp_dirs: Arc::new(DefaultTempDirProvider::default()),
            generator: Box::new(DefaultReportGenerator::default()),
            archiver: Arc::new(TarArchiver::default()),
        }
    }

    /// Collect a diagnostic report into a fresh temp directory and pack that
    /// directory into `<output_dir>/composer-report-<timestamp>.tgz`.
    ///
    /// Steps run strictly in order and the first failure is returned. The temp
    /// directory is never removed, even on failure.
    pub async fn handler(&mut self, _args: &ReportArgs) -> Result<ReportOutcome, ReportError> {
        info!(target: "always", "Creating Composer report");

        let temp_root = self.temp_dirs.temp_root();
        let temp_dir = self.temp_dirs.create_dir(&temp_root, REPORT_PREFIX)?;
        debug!("Collecting report files in {}", temp_dir.display());

        self.generator.set_directory(&temp_dir)?;
        info!(target: "always", "Triggering node report...");
        let diagnostic_report = self.generator.trigger_report()?;

        let name = report_name(&Utc::now());
        let options = ArchiveOptions {
            cwd: with_trailing_separator(&temp_dir),
            prefix: name.clone(),
            gzip: true,
            file: self
                .output_dir
                .join(format!("{}.{}", name, ARCHIVE_EXTENSION)),
        };
        let output_file = self
            .archiver
            .create(options, vec![".".to_string()])
            .await?;

        let display_path = output_file
            .normalize()
            .map(|x| x.into_path_buf().display().to_string())
            .unwrap_or_else(|_| output_file.display().to_string());
        info!(target: "always", "{} {}", "Successfully created Composer report file to".green(), self.output_dir.display());
        info!(target: "always", "Output file: {}", display_path);

        Ok(ReportOutcome {
            temp_dir,
            diagnostic_report,
            output_file,
        })
    }
}
