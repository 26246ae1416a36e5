//! Entry point (SPEC_FULL.md §4.13).
//!
//! Grounded on `main.py`'s `run_interrogator`/`perform_cleanup`: load config,
//! configure logging, construct the adapters, run the chosen driver to
//! completion. Exit 0 on success, non-zero when a fatal error propagates.

mod cli;
mod config;
mod inject;
mod logging;

use clap::Parser;
use tracing::{error, info};

use crate::cli::{Cli, Command};
use crate::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    logging::init_tracing(&config.log_level);

    let result = match cli.command {
        Command::Interrogate => run_interrogate(&config).await,
        Command::Cleanup => run_cleanup(&config).await,
    };

    if let Err(err) = &result {
        error!(error = %err, "worker run failed");
    }
    result
}

async fn run_interrogate(config: &Config) -> anyhow::Result<()> {
    let interrogator = inject::prepare_interrogator(config)?;
    info!("starting file interrogation pass");
    interrogator.interrogate_new_files().await?;
    info!("file interrogation pass complete");
    Ok(())
}

async fn run_cleanup(config: &Config) -> anyhow::Result<()> {
    let cleaner = inject::prepare_cleaner(config)?;
    info!("starting interrogation bucket cleanup");
    cleaner.scan_and_clean().await?;
    info!("interrogation bucket cleanup complete");
    Ok(())
}
