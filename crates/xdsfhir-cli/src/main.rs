mod cli;
mod commands;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands, ConfigCommands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // A missing .env is fine; a malformed one is reported.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("warning: failed to load .env: {e}");
        }
    }

    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();
    let cfg = xdsfhir_config::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    observability::init_tracing_with_level(&cfg.logging.level);
    tracing::debug!(backend = %cfg.backend.base_url, "Configuration loaded");

    match &cli.command {
        Commands::Query(args) => commands::query::run(&cfg, args, format).await?,
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => commands::show_config(&cfg)?,
        },
    }

    Ok(())
}
