mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("cifcache v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let build_config = config::build_config(&cli)?;
    match &cli.command {
        Commands::Chains(_) => info!("Dispatching to 'chains' command."),
        Commands::Entries(_) => info!("Dispatching to 'entries' command."),
    }

    // stdout may carry the cache itself, so status lines go to stderr.
    match commands::build::run(build_config, !cli.quiet).await {
        Ok(summary) => {
            if !cli.quiet {
                eprintln!(
                    "Cache written with {} entries ({} file(s) parsed, {} skipped).",
                    summary.entries,
                    summary.succeeded,
                    summary.soft_failed + summary.failed
                );
            }
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(e)
        }
    }
}
