//! Core application wiring
//!
//! Builds the backend client from configuration, owns the job event registry
//! and starts the interactive dashboard or the non-interactive commands.

mod bus;
mod feed;

pub use bus::*;
pub use feed::spawn_demo_feed;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    api::{DemoJobsApi, HttpJobsApi, JobQuery, JobSummary, JobsApi},
    config::Config,
    tui,
};

/// Main application structure
pub struct App {
    config: Config,
    api: Arc<dyn JobsApi>,
    demo: Option<Arc<DemoJobsApi>>,
    registry: TopicRegistry,
    feed: Option<JoinHandle<()>>,
}

impl App {
    /// Create a new application instance
    pub async fn new(config: Config) -> Result<Self> {
        debug!("Creating new App instance");
        config.validate()?;

        let (api, demo): (Arc<dyn JobsApi>, _) = match (&config.api_url, config.use_demo_data()) {
            (Some(url), false) => {
                info!(url = %url, "Using scheduler backend");
                let timeout = Duration::from_secs(config.request_timeout_secs);
                let api: Arc<dyn JobsApi> = Arc::new(HttpJobsApi::new(url, timeout)?);
                (api, None)
            }
            _ => {
                info!(jobs = config.demo_jobs, "Using demo data");
                let demo = Arc::new(
                    DemoJobsApi::seeded(config.demo_jobs).with_latency(Duration::from_millis(150)),
                );
                (Arc::clone(&demo) as Arc<dyn JobsApi>, Some(demo))
            }
        };

        Ok(Self {
            config,
            api,
            demo,
            registry: TopicRegistry::new(),
            feed: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> Arc<dyn JobsApi> {
        Arc::clone(&self.api)
    }

    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    /// Start publishing job events. Only demo data has an event source.
    fn start_event_feed(&mut self) {
        if self.feed.is_some() {
            return;
        }
        if let Some(demo) = &self.demo {
            let interval = Duration::from_millis(self.config.demo_event_interval_ms);
            self.feed = Some(spawn_demo_feed(self.registry.clone(), Arc::clone(demo), interval));
        }
    }

    /// Run the application in interactive mode (TUI)
    pub async fn run_interactive(&mut self) -> Result<()> {
        info!("Starting interactive mode");
        self.start_event_feed();

        let result = tui::run(self).await;

        if let Some(feed) = self.feed.take() {
            feed.abort();
        }
        result
    }

    /// Fetch one page of jobs without starting the dashboard
    pub async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobSummary>> {
        Ok(self.api.list_jobs(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_app_lists_jobs() {
        let config = Config {
            demo_jobs: 7,
            ..Default::default()
        };
        let app = App::new(config).await.unwrap();
        let jobs = app
            .list_jobs(&JobQuery {
                offset: 5,
                limit: 10,
                enabled_only: false,
            })
            .await
            .unwrap();
        assert_eq!(jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = Config {
            page_size: 0,
            ..Default::default()
        };
        assert!(App::new(config).await.is_err());
    }
}
