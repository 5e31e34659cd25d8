use super::command::ReportCommand;
use crate::shared::prelude::FoundConfig;
use anyhow::Result;
use clap::Args;
use tracing::debug;

/// Bundle a diagnostic report of this process into a `.tgz` in the working dir.
#[derive(Debug, Default, Args)]
pub struct ReportArgs {}

pub async fn report_root(found_config: &FoundConfig, args: &ReportArgs) -> Result<i32> {
    let mut command = ReportCommand::new(found_config.working_dir.clone());
    let outcome = command.handler(args).await?;
    debug!("Report finished {:?}", outcome);

    Ok(0)
}
