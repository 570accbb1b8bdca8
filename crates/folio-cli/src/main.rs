//! Folio CLI
//!
//! Loads the config, installs logging, then runs one subcommand. Results go
//! to stdout; progress and logs go to stderr.

mod args;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use args::{Args, Commands};
use folio::config::load_config_or_default;
use folio::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let Args { config, command } = Args::parse();

    let config = load_config_or_default(config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging)?;
    debug!(version = env!("CARGO_PKG_VERSION"), "folio started");

    match command {
        Commands::CheckConfig => commands::check_config(&config),
        Commands::Templates(args) => commands::templates(&config, &args),
        Commands::Generate(args) => commands::generate(config, &args).await,
    }
}
