use anyhow::Result;
use clap::{Parser, Subcommand};
use composer_cli::prelude::*;
use human_panic::setup_panic;
use tracing::{Level, enabled, error, info};

/// composer
///
/// Command line tooling for Composer. The `report` command collects a
/// diagnostic snapshot of the local environment into an archive that can be
/// attached to bug reports.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(flatten)]
    logging: LoggingOpts,

    #[clap(flatten)]
    config: ConfigOptions,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a diagnostic report archive in the working directory
    #[clap(alias("r"))]
    Report(ReportArgs),
}

#[tokio::main]
async fn main() {
    setup_panic!();
    dotenvy::dotenv().ok();
    let mut opts = Cli::parse();
    let run_id = opts.config.ensure_run_id();

    let log_file = match opts.logging.configure_logging(&run_id, "root") {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("Unable to configure logging: {:?}", e);
            std::process::exit(2);
        }
    };
    let error_code = run_subcommand(opts).await;

    if let Some(log_file) = log_file {
        if error_code != 0 || enabled!(Level::DEBUG) {
            info!(target: "user", "More detailed logs at {}", log_file.location);
        }
        drop(log_file.guard);
    }

    std::process::exit(error_code);
}

async fn run_subcommand(opts: Cli) -> i32 {
    let loaded_config = match opts.config.load_config().await {
        Err(e) => {
            error!(target: "user", "Failed to load configuration: {}", e);
            return 2;
        }
        Ok(c) => c,
    };

    handle_commands(&loaded_config, &opts.command)
        .await
        .unwrap_or_else(|e| {
            error!(target: "user", "Critical Error. {}", e);
            1
        })
}

async fn handle_commands(found_config: &FoundConfig, command: &Command) -> Result<i32> {
    match command {
        Command::Report(args) => report_root(found_config, args).await,
    }
}
