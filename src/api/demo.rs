//! In-memory job table used when no backend is configured

use super::{ApiError, ApiResult, JobQuery, JobStatus, JobSummary, JobsApi};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::sync::RwLock;

const NAMES: &[&str] = &[
    "nightly-backup",
    "sync-invoices",
    "rotate-logs",
    "refresh-cache",
    "send-digest",
    "prune-sessions",
    "reindex-search",
    "export-metrics",
];

const SCHEDULES: &[&str] = &[
    "0 3 * * *",
    "*/15 * * * *",
    "0 * * * *",
    "30 6 * * 1-5",
    "0 0 1 * *",
];

pub struct DemoJobsApi {
    jobs: RwLock<Vec<JobSummary>>,
    latency: Duration,
}

impl DemoJobsApi {
    /// Create a table of `count` generated jobs
    pub fn seeded(count: usize) -> Self {
        let now = Utc::now();
        let jobs = (0..count)
            .map(|i| JobSummary {
                id: format!("job-{:04}", i + 1),
                name: format!("{}-{}", NAMES[i % NAMES.len()], i / NAMES.len() + 1),
                schedule: SCHEDULES[i % SCHEDULES.len()].to_string(),
                enabled: true,
                last_status: JobStatus::Idle,
                next_run: Some(now + ChronoDuration::minutes((i as i64 + 1) * 7)),
            })
            .collect();

        Self {
            jobs: RwLock::new(jobs),
            latency: Duration::ZERO,
        }
    }

    /// Simulated network delay applied to list requests
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn job_ids(&self) -> Vec<String> {
        self.jobs.read().await.iter().map(|job| job.id.clone()).collect()
    }

    pub async fn set_status(&self, id: &str, status: JobStatus) -> ApiResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        job.last_status = status;
        Ok(())
    }
}

#[async_trait]
impl JobsApi for DemoJobsApi {
    async fn list_jobs(&self, query: &JobQuery) -> ApiResult<Vec<JobSummary>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let jobs = self.jobs.read().await;
        Ok(jobs
            .iter()
            .filter(|job| !query.enabled_only || job.enabled)
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn run_job(&self, id: &str) -> ApiResult<()> {
        self.set_status(id, JobStatus::Running).await
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> ApiResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        job.enabled = enabled;
        Ok(())
    }

    async fn delete_job(&self, id: &str) -> ApiResult<()> {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|job| job.id != id);
        if jobs.len() == before {
            return Err(ApiError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(offset: usize, limit: usize) -> JobQuery {
        JobQuery {
            offset,
            limit,
            enabled_only: false,
        }
    }

    #[tokio::test]
    async fn test_paging() {
        let api = DemoJobsApi::seeded(12);
        let first = api.list_jobs(&page(0, 5)).await.unwrap();
        let last = api.list_jobs(&page(10, 5)).await.unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(first[0].id, "job-0001");
        assert_eq!(last.len(), 2);
        assert!(api.list_jobs(&page(12, 5)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutations() {
        let api = DemoJobsApi::seeded(3);
        api.run_job("job-0002").await.unwrap();
        api.delete_job("job-0003").await.unwrap();

        let jobs = api.list_jobs(&page(0, 10)).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].last_status, JobStatus::Running);

        assert!(matches!(api.delete_job("job-0003").await, Err(ApiError::NotFound(_))));
        assert!(matches!(api.set_enabled("nope", false).await, Err(ApiError::NotFound(_))));
    }
}
