//! Non-interactive job listing

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use tracing::debug;

use crate::api::{JobQuery, JobSummary, JobsPageLoader};
use crate::app::App;
use crate::config::Config;
use crate::tui::components::lists::{FocusListConfig, PaginatedFocusList};
use crate::tui::utils::text::fit;

/// Inspect scheduled jobs without starting the dashboard
#[derive(Debug, Args)]
pub struct JobsCommand {
    #[command(subcommand)]
    pub command: JobsSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum JobsSubcommand {
    /// Print one page of jobs, or every job with --all
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Index of the first job to print
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Keep fetching pages until the backend runs out
    #[arg(long, conflicts_with = "offset")]
    pub all: bool,

    /// Number of jobs to print (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only show enabled jobs
    #[arg(long)]
    pub enabled_only: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl JobsCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        match &self.command {
            JobsSubcommand::List(args) => {
                let query = JobQuery {
                    offset: args.offset,
                    limit: args.limit.unwrap_or(config.page_size),
                    enabled_only: args.enabled_only,
                };
                debug!(?query, "Listing jobs");

                let app = App::new(config.clone()).await?;
                let jobs = if args.all {
                    fetch_all(&app, query).await?
                } else {
                    app.list_jobs(&query).await?
                };

                if args.json {
                    println!("{}", serde_json::to_string_pretty(&jobs)?);
                } else {
                    print!("{}", format_table(&jobs));
                }
                Ok(())
            }
        }
    }
}

/// Page through the backend with the same list the dashboard scrolls
async fn fetch_all(app: &App, query: JobQuery) -> Result<Vec<JobSummary>> {
    if query.limit == 0 {
        bail!("--all needs a page size of at least 1");
    }
    let mut list = PaginatedFocusList::new(FocusListConfig {
        page_size: query.limit,
        auto_focus_first: false,
        auto_select_first: false,
    });
    list.set_external_list(app.list_jobs(&query).await?);

    let loader = JobsPageLoader::new(app.api(), query.enabled_only);
    while list.has_more() {
        list.load_more(&loader).await;
        if list.load_failed() {
            bail!("Failed to fetch jobs after {} rows", list.len());
        }
    }
    debug!(rows = list.len(), "Fetched every page");
    Ok(list.items().to_vec())
}

fn format_table(jobs: &[JobSummary]) -> String {
    let mut out = format!(
        "{} {} {} {} {}\n",
        fit("ID", 10),
        fit("NAME", 28),
        fit("SCHEDULE", 14),
        fit("STATUS", 8),
        "NEXT RUN"
    );
    for job in jobs {
        let name = if job.enabled {
            job.name.clone()
        } else {
            format!("{} (disabled)", job.name)
        };
        let next_run = job
            .next_run
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{} {} {} {} {}\n",
            fit(&job.id, 10),
            fit(&name, 28),
            fit(&job.schedule, 14),
            fit(job.last_status.label(), 8),
            next_run
        ));
    }
    if jobs.is_empty() {
        out.push_str("No jobs found\n");
    }
    out
}
