use clap::Parser;
use tracing_subscriber::EnvFilter;

use donation_allocator::{simulate, validate};

mod cli;
mod example;
mod schema;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Schema => schema::run(),
        cli::Command::Validate { file } => validate::run(&file),
        cli::Command::Example => example::run(),
        cli::Command::Simulate { file, output } => simulate::run(&simulate::SimulationConfig {
            scenario_path: file,
            output,
        }),
    }
}
