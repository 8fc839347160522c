//! ocstore CLI - Entry point
//!
//! Usage: ocstore [--storage <path>] [--db <path>] [--legacy] <command>

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocstore::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (stderr, so JSON output stays clean)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();
    let opts = cli.open_options()?;
    tracing::debug!(?opts, "resolved storage options");

    match cli.command {
        Commands::Check(args) => ocstore::cli::check::run(args, &opts),
        Commands::Projects(args) => ocstore::cli::projects::run(args, &opts).await,
        Commands::Sessions(args) => ocstore::cli::sessions::run(args, &opts).await,
    }
}
