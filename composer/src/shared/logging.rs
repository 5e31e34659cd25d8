use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use indicatif::ProgressStyle;
use std::fs::File;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::{IndicatifFilter, hide_indicatif_span_fields};
use tracing_subscriber::fmt::format::DefaultFields;
use tracing_subscriber::{Registry, fmt::format::Format, fmt::format::PrettyFields};
use tracing_subscriber::{filter::filter_fn, prelude::*};

pub const LOG_DIR_NAME: &str = "composer";

pub fn progress_bar_without_pos() -> ProgressStyle {
    ProgressStyle::with_template(
        "{span_child_prefix} {spinner:.green} {wide_msg} [{elapsed_precise}]",
    )
    .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[derive(Parser, Debug)]
#[clap(group = ArgGroup::new("logging"))]
pub struct LoggingOpts {
    /// A level of verbosity, and can be used multiple times
    #[arg(short, long, action = clap::ArgAction::Count, global(true))]
    pub verbose: u8,

    #[arg(
        long,
        global(true),
        default_value = "auto",
        env = "COMPOSER_OUTPUT_PROGRESS"
    )]
    /// Set the progress output. Use plain to disable updating UI.
    pub progress: LoggingProgress,

    #[arg(skip = LevelFilter::INFO)]
    default_level: LevelFilter,
}

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoggingProgress {
    /// Determine output format based on execution context
    Auto,
    /// Standard output, no progress bar, no auto-updating output.
    Plain,
    /// Use progress bar
    Tty,
}

impl LoggingProgress {
    fn is_tty(&self) -> bool {
        match self {
            LoggingProgress::Auto => std::io::stdout().is_terminal(),
            LoggingProgress::Plain => false,
            LoggingProgress::Tty => true,
        }
    }
}

/// Directory holding the log files of every run, `<temp root>/composer`.
pub fn log_dir() -> PathBuf {
    std::env::temp_dir().join(LOG_DIR_NAME)
}

/// Destination of the detailed log, absent when it could not be opened.
pub struct LogFile {
    pub guard: tracing_appender::non_blocking::WorkerGuard,
    pub location: String,
}

fn open_log_file(
    log_dir: &Path,
    run_id: &str,
    prefix: &str,
) -> Result<(tracing_appender::non_blocking::NonBlocking, LogFile)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Unable to create log dir {}", log_dir.display()))?;

    let file_path = log_dir.join(format!("composer-{}-{}.log", prefix, run_id));
    let log_file = File::create(&file_path)
        .with_context(|| format!("Unable to create log file {}", file_path.display()))?;
    let (non_blocking, guard) =
        tracing_appender::non_blocking(strip_ansi_escapes::Writer::new(log_file));

    Ok((
        non_blocking,
        LogFile {
            guard,
            location: file_path.display().to_string(),
        },
    ))
}

impl LoggingOpts {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => self.default_level,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Installs the global subscriber. Console output is filtered by target
    /// (`user`, `always`), everything goes to the log file. When the log file
    /// cannot be opened the console keeps working and `None` is returned.
    pub fn configure_logging(&self, run_id: &str, prefix: &str) -> Result<Option<LogFile>> {
        let (file_writer, log_file, file_error) = match open_log_file(&log_dir(), run_id, prefix) {
            Ok((writer, log_file)) => (Some(writer), Some(log_file), None),
            Err(e) => (None, None, Some(e)),
        };

        let file_output = file_writer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .event_format(Format::default().pretty())
                .with_ansi(false)
                .with_writer(writer)
        });

        let indicatif_layer = IndicatifLayer::new()
            .with_span_field_formatter(hide_indicatif_span_fields(DefaultFields::new()))
            .with_progress_style(progress_bar_without_pos());
        let indicatif_writer = indicatif_layer.get_stdout_writer();

        let is_tty_output = self.progress.is_tty();

        let level_filter = self.to_level_filter();
        let console_output = tracing_subscriber::fmt::layer()
            .event_format(
                Format::default()
                    .with_target(false)
                    .without_time()
                    .compact(),
            )
            .with_writer(indicatif_writer)
            .fmt_fields(PrettyFields::new())
            .with_filter(filter_fn(move |metadata| match metadata.target() {
                "user" => level_filter >= *metadata.level(),
                "always" => true,
                _ => false,
            }));

        let progress_layer = if is_tty_output {
            Some(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        } else {
            None
        };

        let subscriber = Registry::default()
            .with(console_output)
            .with(progress_layer)
            .with(file_output);

        tracing::subscriber::set_global_default(subscriber)
            .context("setting default subscriber failed")?;

        if let Some(e) = file_error {
            debug!(target: "user", "Detailed logs are disabled. {:?}", e);
        }

        Ok(log_file)
    }
}
