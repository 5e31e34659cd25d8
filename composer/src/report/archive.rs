use super::error::ReportError;
use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use mockall::automock;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{Instrument, debug, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Directory the input paths are resolved against.
    pub cwd: PathBuf,
    /// Top level directory of every entry inside the archive.
    pub prefix: String,
    pub gzip: bool,
    /// Archive to create.
    pub file: PathBuf,
}

#[automock]
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Pack `paths` (relative to `options.cwd`) into `options.file`, returning the
    /// path of the written archive.
    async fn create(
        &self,
        options: ArchiveOptions,
        paths: Vec<String>,
    ) -> Result<PathBuf, ReportError>;
}

#[derive(Debug, Default)]
pub struct TarArchiver {}

#[async_trait]
impl Archiver for TarArchiver {
    async fn create(
        &self,
        options: ArchiveOptions,
        paths: Vec<String>,
    ) -> Result<PathBuf, ReportError> {
        let span = info_span!("archive", "indicatif.pb_show" = true);
        span.pb_set_message(&format!("Compressing {}", options.prefix));

        let file = options.file.clone();
        let result = tokio::task::spawn_blocking(move || write_archive(&options, &paths))
            .instrument(span)
            .await;

        match result {
            Ok(Ok(())) => {
                debug!("Archive {} was written", file.display());
                Ok(file)
            }
            Ok(Err(error)) => Err(ReportError::ArchiveCreationError { file, error }),
            Err(join_error) => Err(ReportError::ArchiveCreationError {
                file,
                error: io::Error::other(join_error),
            }),
        }
    }
}

fn write_archive(options: &ArchiveOptions, paths: &[String]) -> io::Result<()> {
    let output = File::create(&options.file)?;
    if options.gzip {
        let encoder = GzEncoder::new(output, Compression::default());
        let encoder = append_paths(tar::Builder::new(encoder), options, paths)?;
        encoder.finish()?.sync_all()
    } else {
        append_paths(tar::Builder::new(output), options, paths)?.sync_all()
    }
}

fn append_paths<W: Write>(
    mut builder: tar::Builder<W>,
    options: &ArchiveOptions,
    paths: &[String],
) -> io::Result<W> {
    builder.follow_symlinks(false);

    for path in paths {
        let source = options.cwd.join(path);
        let name = entry_name(&options.prefix, path);
        if source.is_dir() {
            builder.append_dir_all(&name, &source)?;
        } else if source.is_file() {
            builder.append_path_with_name(&source, &name)?;
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", source.display()),
            ));
        }
    }

    builder.into_inner()
}

/// `prefix` joined with the normal components of `path`, so `.` maps to the prefix itself.
fn entry_name(prefix: &str, path: &str) -> PathBuf {
    let mut name = PathBuf::from(prefix);
    for component in Path::new(path).components() {
        if let Component::Normal(part) = component {
            name.push(part);
        }
    }
    name
}
