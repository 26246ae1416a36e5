//! Command-line surface (SPEC_FULL.md §4.13/§6).
//!
//! Grounded on `cli.py`'s two Typer commands, `interrogate` and `cleanup`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dhfs-worker", about = "GHGA data hub file interrogation worker")]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "./config.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the file interrogation and re-encryption process once.
    Interrogate,
    /// Run the interrogation-bucket cleanup routine once.
    Cleanup,
}
