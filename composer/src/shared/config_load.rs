use crate::shared::RUN_ID_ENV_VAR;
use anyhow::{Result, anyhow};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing::{debug, error};

#[derive(Parser, Debug, Default)]
#[clap(group = ArgGroup::new("config"))]
pub struct ConfigOptions {
    /// Override the working directory. Reports are written here.
    #[arg(long, short = 'C', global(true))]
    working_dir: Option<String>,

    /// When outputting logs, or other files, the run-id is the unique value that will define where these go.
    /// In the case that the run-id is re-used, the old values will be overwritten.
    #[arg(long, global(true), env = RUN_ID_ENV_VAR)]
    run_id: Option<String>,
}

impl ConfigOptions {
    pub fn generate_run_id() -> String {
        let id = nanoid::nanoid!(4, &nanoid::alphabet::SAFE);
        let now = chrono::Local::now();
        let current_time = now.format("%Y%m%d");
        format!("{}-{}", current_time, id)
    }

    pub fn get_run_id(&self) -> String {
        self.run_id.clone().unwrap_or_else(Self::generate_run_id)
    }

    /// Pin the run id so the log file and the loaded config agree on it.
    pub fn ensure_run_id(&mut self) -> String {
        self.run_id
            .get_or_insert_with(Self::generate_run_id)
            .clone()
    }

    pub async fn load_config(&self) -> Result<FoundConfig> {
        let current_dir = std::env::current_dir();
        let working_dir = match (current_dir, &self.working_dir) {
            (Ok(cwd), None) => cwd,
            (_, Some(dir)) => PathBuf::from(&dir),
            _ => {
                error!(target: "user", "Unable to get a working dir");
                return Err(anyhow!("Unable to get a working dir"));
            }
        };

        if !working_dir.is_dir() {
            return Err(anyhow!(
                "Working dir {} is not a directory",
                working_dir.display()
            ));
        }

        let found_config = FoundConfig {
            working_dir,
            run_id: self.get_run_id(),
        };

        debug!("Loaded config {:?}", found_config);

        Ok(found_config)
    }
}

#[derive(Debug, Clone)]
pub struct FoundConfig {
    pub working_dir: PathBuf,
    pub run_id: String,
}
