use assert_cmd::Command;
use assert_cmd::assert::Assert;
use assert_fs::TempDir;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct ComposerTestHelper<'a> {
    pub work_dir: TempDir,
    pub tmp_dir: TempDir,
    name: &'a str,
    counter: AtomicUsize,
}

impl<'a> ComposerTestHelper<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            tmp_dir: TempDir::new().unwrap(),
            name,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("composer").unwrap();
        cmd.current_dir(self.work_dir.path())
            .env("TMPDIR", self.tmp_dir.path())
            .env(
                "COMPOSER_RUN_ID",
                format!(
                    "{}-{}",
                    self.name,
                    self.counter.fetch_add(1, Ordering::Relaxed)
                ),
            )
            .env("COMPOSER_OUTPUT_PROGRESS", "plain")
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn run_command(&self, args: &[&str]) -> Assert {
        self.command().args(args).assert()
    }

    /// Archives in the working directory, sorted by name.
    pub fn archives(&self) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(self.work_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "tgz"))
            .collect();
        found.sort();
        found
    }

    /// Report directories left behind in the temp root.
    pub fn report_temp_dirs(&self) -> Vec<PathBuf> {
        fs::read_dir(self.tmp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.is_dir()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with("composer-report-"))
            })
            .collect()
    }

    pub fn clean_work_dir(self) {
        self.work_dir.close().unwrap();
        self.tmp_dir.close().unwrap();
    }
}

pub fn archive_entries(archive: &Path) -> Vec<String> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(archive).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().display().to_string())
        .collect()
}
