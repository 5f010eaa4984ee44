use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use super::{ConfigCommand, JobsCommand};
use crate::app::App;
use crate::config::Config;

/// jobdeck - browse and manage scheduled jobs from the terminal
#[derive(Parser)]
#[command(
    name = "jobdeck",
    version,
    about = "Browse and manage scheduled jobs from the terminal",
    long_about = r#"jobdeck shows the jobs of a scheduler backend as a paginated, keyboard driven list.
Without an API URL it runs against generated demo data.

Examples:
  jobdeck                                   # Start the dashboard
  jobdeck --api-url http://localhost:8080   # Use a real backend
  jobdeck jobs list --limit 20 --json       # Print one page of jobs"#
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Scheduler backend base URL
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// Use generated demo data instead of a backend
    #[arg(long, global = true)]
    pub demo: bool,

    /// Read configuration from this file instead of the default locations
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Work with jobs non-interactively
    Jobs(JobsCommand),
    /// Inspect configuration
    Config(ConfigCommand),
}

impl Cli {
    /// Whether this invocation starts the full-screen dashboard
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }

    /// Resolve configuration: defaults, then file, then environment, then flags
    pub async fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = Config::load_from_path(path).await?;
                config.load_from_env();
                config
            }
            None => Config::init().await?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api_url = Some(url.clone());
        }
        if self.demo {
            config.demo = true;
        }
    }

    pub async fn execute(self, config: Config) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        match self.command {
            Some(Commands::Jobs(jobs_cmd)) => jobs_cmd.execute(&config).await,
            Some(Commands::Config(config_cmd)) => config_cmd.execute(&config).await,
            None => Self::start_interactive_mode(config).await,
        }
    }

    async fn start_interactive_mode(config: Config) -> Result<()> {
        info!("Starting interactive mode");

        let mut app = App::new(config).await?;
        app.run_interactive().await?;

        info!("Application finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jobs_list() {
        let cli = Cli::try_parse_from([
            "jobdeck",
            "jobs",
            "list",
            "--offset",
            "20",
            "--limit",
            "5",
            "--enabled-only",
        ])
        .unwrap();

        assert!(!cli.is_interactive());
        match cli.command {
            Some(Commands::Jobs(JobsCommand {
                command: super::super::jobs::JobsSubcommand::List(args),
            })) => {
                assert_eq!(args.offset, 20);
                assert_eq!(args.limit, Some(5));
                assert!(args.enabled_only);
                assert!(!args.json);
            }
            _ => panic!("expected jobs list"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from(["jobdeck", "--api-url", "http://jobs.local", "--demo"]).unwrap();
        assert!(cli.is_interactive());

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.api_url.as_deref(), Some("http://jobs.local"));
        assert!(config.use_demo_data());
    }
}
