//! Client side of the scheduler backend
//!
//! The backend is an external system. The dashboard only needs a handful of
//! job operations, expressed by the [`JobsApi`] trait, with an HTTP
//! implementation for real deployments and an in-memory one for demos.

mod demo;
mod errors;
mod http;

pub use demo::DemoJobsApi;
pub use errors::{ApiError, ApiResult};
pub use http::HttpJobsApi;

use crate::tui::components::lists::PageLoader;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Last known run state of a job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "ok",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Row of the job list as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub name: String,
    /// Cron expression
    pub schedule: String,
    pub enabled: bool,
    #[serde(default)]
    pub last_status: JobStatus,
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
}

/// Paging and filter parameters for [`JobsApi::list_jobs`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    pub offset: usize,
    pub limit: usize,
    pub enabled_only: bool,
}

#[async_trait]
pub trait JobsApi: Send + Sync {
    async fn list_jobs(&self, query: &JobQuery) -> ApiResult<Vec<JobSummary>>;

    /// Trigger an immediate run
    async fn run_job(&self, id: &str) -> ApiResult<()>;

    async fn set_enabled(&self, id: &str, enabled: bool) -> ApiResult<()>;

    async fn delete_job(&self, id: &str) -> ApiResult<()>;
}

/// Adapts a [`JobsApi`] to the paginated list's loader interface
#[derive(Clone)]
pub struct JobsPageLoader {
    api: Arc<dyn JobsApi>,
    enabled_only: bool,
}

impl JobsPageLoader {
    pub fn new(api: Arc<dyn JobsApi>, enabled_only: bool) -> Self {
        Self { api, enabled_only }
    }
}

#[async_trait]
impl PageLoader<JobSummary> for JobsPageLoader {
    async fn load_page(&self, offset: usize, limit: usize) -> anyhow::Result<Vec<JobSummary>> {
        let query = JobQuery {
            offset,
            limit,
            enabled_only: self.enabled_only,
        };
        Ok(self.api.list_jobs(&query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_summary_defaults_missing_fields() {
        let json = r#"{"id":"j1","name":"backup","schedule":"0 3 * * *","enabled":true}"#;
        let job: JobSummary = serde_json::from_str(json).unwrap();
        assert_eq!(job.last_status, JobStatus::Idle);
        assert!(job.next_run.is_none());
    }

    #[test]
    fn test_job_status_wire_names() {
        let status: JobStatus = serde_json::from_str("\"succeeded\"").unwrap();
        assert_eq!(status, JobStatus::Succeeded);
        assert_eq!(serde_json::to_string(&JobStatus::Running).unwrap(), "\"running\"");
    }

    #[tokio::test]
    async fn test_page_loader_respects_filter() {
        let api: Arc<dyn JobsApi> = Arc::new(DemoJobsApi::seeded(12));
        api.set_enabled("job-0001", false).await.unwrap();

        let all = JobsPageLoader::new(Arc::clone(&api), false);
        let enabled = JobsPageLoader::new(api, true);

        assert_eq!(all.load_page(0, 50).await.unwrap().len(), 12);
        let page = enabled.load_page(0, 50).await.unwrap();
        assert_eq!(page.len(), 11);
        assert!(page.iter().all(|job| job.enabled));
    }
}
