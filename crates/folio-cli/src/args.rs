use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Generate, upload and deploy a portfolio site from a profile.
///
/// Vendor credentials are resolved from the config file: a direct value, a
/// mounted file or an environment variable (`OPENAI_API_KEY`,
/// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `VERCEL_TOKEN` by
/// default).
#[derive(Parser, Debug)]
#[command(version, about, name = "folio")]
pub struct Args {
    /// Path to the JSON config file. Defaults to
    /// $XDG_CONFIG_HOME/folio/config.json, then built-in defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate a config file
    CheckConfig,

    /// Rank templates for the profile in a request file
    #[command(alias = "t")]
    Templates(TemplatesArgs),

    /// Run one generation job and print the final job as JSON
    #[command(alias = "g")]
    Generate(GenerateArgs),
}

#[derive(ClapArgs, Debug)]
pub struct TemplatesArgs {
    /// Generation request JSON
    #[arg(short, long)]
    pub request: PathBuf,

    /// How many templates to show. Defaults to pipeline.recommendations
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Print the ranking as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct GenerateArgs {
    /// Generation request JSON
    #[arg(short, long)]
    pub request: PathBuf,

    /// Use offline content, in-memory storage and a simulated deployment
    #[arg(long)]
    pub offline: bool,
}
