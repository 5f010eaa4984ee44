use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::Config;

/// Inspect the effective configuration
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Print the merged configuration as JSON
    Show,
    /// List the files searched for configuration, highest priority first
    Paths,
}

impl ConfigCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        match self.command {
            ConfigSubcommand::Show => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
            ConfigSubcommand::Paths => {
                for path in Config::config_paths() {
                    let marker = if path.exists() { "*" } else { " " };
                    println!("{} {}", marker, path.display());
                }
            }
        }
        Ok(())
    }
}
