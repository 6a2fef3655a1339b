use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use classdep::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Classes {
            paths,
            include_private,
            format,
        } => classdep::cli::run_classes(&paths, include_private, format),
        Commands::Graph {
            paths,
            view,
            include_private,
            format,
        } => classdep::cli::run_graph(&paths, view, include_private, format),
        Commands::Cycles {
            paths,
            view,
            include_private,
            format,
        } => classdep::cli::run_cycles(&paths, view, include_private, format),
        Commands::Metrics {
            paths,
            view,
            hub_floor,
            include_private,
            format,
        } => classdep::cli::run_metrics(&paths, view, hub_floor, include_private, format),
    }
}
