pub mod query;

use anyhow::Result;
use colored::Colorize;
use xdsfhir_config::AppConfig;

pub fn show_config(cfg: &AppConfig) -> Result<()> {
    println!("{}", "# effective configuration".cyan());
    println!("{}", cfg.to_toml()?);
    Ok(())
}
