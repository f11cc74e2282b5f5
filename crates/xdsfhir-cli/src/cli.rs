use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "xdsfhir")]
#[command(about = "Run registry stored queries against an MHD FHIR server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./xdsfhir.toml when present)
    #[arg(short, long, global = true, env = "XDSFHIR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the stored query in a JSON file
    Query(QueryArgs),
    /// Inspect the effective configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct QueryArgs {
    /// JSON stored query, e.g. {"type": "GetDocuments", "uuids": ["urn:uuid:..."]}
    pub file: PathBuf,
    /// Return object references instead of full objects
    #[arg(long)]
    pub object_ref: bool,
    /// Override query.max_results for this run
    #[arg(long)]
    pub max_results: Option<usize>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the merged configuration
    Show,
}
