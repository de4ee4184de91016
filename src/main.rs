//! CLI entry point for the 3D wave function collapse volume solver

use clap::Parser;
use tracing_subscriber::EnvFilter;
use voxcollapse::io::cli::{Cli, FileProcessor};

fn main() -> voxcollapse::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    // A subscriber installed earlier keeps receiving events
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let mut processor = FileProcessor::new(cli);
    processor.process()
}
