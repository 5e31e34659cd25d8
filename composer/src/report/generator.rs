use super::error::ReportError;
use crate::shared::prelude::Redactor;
use chrono::{Local, Utc};
use lazy_static::lazy_static;
use mockall::automock;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PROC_LIMITS: &str = "/proc/self/limits";
const PROC_STATUS: &str = "/proc/self/status";
const STATUS_FIELDS: [&str; 9] = [
    "Name",
    "State",
    "Threads",
    "VmPeak",
    "VmSize",
    "VmHWM",
    "VmRSS",
    "voluntary_ctxt_switches",
    "nonvoluntary_ctxt_switches",
];

lazy_static! {
    static ref COLUMN_SEPARATOR: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Produces diagnostic snapshots of the running process.
#[automock]
pub trait ReportGenerator: Send + Sync {
    /// Set the directory new reports are written to.
    fn set_directory(&mut self, directory: &Path) -> Result<(), ReportError>;

    /// Write a report into the configured directory and return its path.
    fn trigger_report(&mut self) -> Result<PathBuf, ReportError>;
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportHeader {
    pub event: String,
    pub trigger: String,
    pub generated_at: String,
    pub pid: u32,
    pub cwd: String,
    pub command_line: Vec<String>,
    pub cli_name: String,
    pub cli_version: String,
    pub os: String,
    pub os_family: String,
    pub arch: String,
    pub hostname: String,
    pub cpus: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceLimit {
    pub resource: String,
    pub soft: String,
    pub hard: String,
    pub units: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub header: ReportHeader,
    pub environment: BTreeMap<String, String>,
    pub limits: Vec<ResourceLimit>,
    pub process_status: BTreeMap<String, String>,
}

impl DiagnosticReport {
    pub fn capture(redactor: &Redactor) -> Self {
        let environment = std::env::vars_os()
            .map(|(name, value)| {
                let name = name.to_string_lossy().to_string();
                let value = redactor.redact_env_var(&name, &value.to_string_lossy());
                (name, value)
            })
            .collect();

        Self {
            header: ReportHeader::capture(redactor),
            environment,
            limits: read_proc_file(PROC_LIMITS)
                .map(|text| parse_limits(&text))
                .unwrap_or_default(),
            process_status: read_proc_file(PROC_STATUS)
                .map(|text| parse_status(&text))
                .unwrap_or_default(),
        }
    }
}

impl ReportHeader {
    fn capture(redactor: &Redactor) -> Self {
        Self {
            event: "report".to_string(),
            trigger: "composer report".to_string(),
            generated_at: Utc::now().to_rfc3339(),
            pid: std::process::id(),
            cwd: std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            command_line: redact_args(redactor, std::env::args_os()),
            cli_name: env!("CARGO_PKG_NAME").to_string(),
            cli_version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            os_family: std::env::consts::FAMILY.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            hostname: gethostname::gethostname().to_string_lossy().to_string(),
            cpus: std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1),
        }
    }
}

fn redact_args<I, S>(redactor: &Redactor, args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .map(|arg| redactor.redact_text(&arg.as_ref().to_string_lossy()))
        .collect()
}

fn read_proc_file(path: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("Skipping {}: {:?}", path, e);
            None
        }
    }
}

/// Parse the column layout of `/proc/<pid>/limits`. The first line is the header.
fn parse_limits(text: &str) -> Vec<ResourceLimit> {
    text.lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = COLUMN_SEPARATOR.split(line.trim()).collect();
            if columns.len() < 3 {
                return None;
            }
            Some(ResourceLimit {
                resource: columns[0].to_string(),
                soft: columns[1].to_string(),
                hard: columns[2].to_string(),
                units: columns.get(3).unwrap_or(&"").to_string(),
            })
        })
        .collect()
}

fn parse_status(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| STATUS_FIELDS.contains(key))
        .map(|(key, value)| {
            let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
            (key.to_string(), value)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct DefaultReportGenerator {
    directory: Option<PathBuf>,
    sequence: u32,
    redactor: Redactor,
}

impl DefaultReportGenerator {
    fn file_name(&self) -> String {
        let now = Local::now();
        format!(
            "composer-diagnostic.{}.{}.{}.{:03}.json",
            now.format("%Y%m%d"),
            now.format("%H%M%S"),
            std::process::id(),
            self.sequence
        )
    }
}

impl ReportGenerator for DefaultReportGenerator {
    fn set_directory(&mut self, directory: &Path) -> Result<(), ReportError> {
        if !directory.is_dir() {
            return Err(ReportError::ReportConfigurationError {
                directory: directory.to_path_buf(),
                reason: "not an existing directory".to_string(),
            });
        }

        debug!("Diagnostic reports will be written to {}", directory.display());
        self.directory = Some(directory.to_path_buf());
        Ok(())
    }

    fn trigger_report(&mut self) -> Result<PathBuf, ReportError> {
        let directory = match &self.directory {
            Some(dir) => dir.clone(),
            None => {
                return Err(ReportError::ReportConfigurationError {
                    directory: PathBuf::new(),
                    reason: "no report directory was set".to_string(),
                });
            }
        };

        self.sequence += 1;
        let path = directory.join(self.file_name());
        let report = DiagnosticReport::capture(&self.redactor);

        write_report(&path, &report)
            .map_err(|error| ReportError::ReportGenerationError {
                path: path.clone(),
                error,
            })?;

        info!("Diagnostic report written to {}", path.display());
        Ok(path)
    }
}

fn write_report(path: &Path, report: &DiagnosticReport) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
