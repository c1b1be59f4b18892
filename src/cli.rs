use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Donation-aware multi-strategy allocator: validate pool configs and
/// simulate deposit/withdraw/report scenarios against simulated strategies.
#[derive(Parser)]
#[command(name = "donation-allocator", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Output the JSON schema for scenario files (embeds the pool config schema)
    Schema,

    /// Validate a pool configuration JSON file
    Validate {
        /// Path to the pool config JSON file
        file: PathBuf,
    },

    /// Output an example scenario JSON to stdout
    Example,

    /// Run a scenario against simulated strategies
    Simulate {
        /// Path to the scenario JSON file
        file: PathBuf,

        /// Output results as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}
