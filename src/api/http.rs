//! HTTP implementation of [`JobsApi`] over the backend's JSON REST endpoints

use super::{ApiError, ApiResult, JobQuery, JobSummary, JobsApi};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

pub struct HttpJobsApi {
    client: Client,
    base_url: String,
}

impl HttpJobsApi {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn list_params(query: &JobQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("offset", query.offset.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if query.enabled_only {
            params.push(("enabled", "true".to_string()));
        }
        params
    }

    async fn check(response: Response, id: Option<&str>) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(ApiError::NotFound(id.to_string()));
            }
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl JobsApi for HttpJobsApi {
    async fn list_jobs(&self, query: &JobQuery) -> ApiResult<Vec<JobSummary>> {
        debug!(offset = query.offset, limit = query.limit, "GET jobs");
        let response = self
            .client
            .get(self.url("jobs"))
            .query(&Self::list_params(query))
            .send()
            .await?;
        let body = Self::check(response, None).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn run_job(&self, id: &str) -> ApiResult<()> {
        debug!(job = id, "POST run");
        let response = self
            .client
            .post(self.url(&format!("jobs/{}/run", id)))
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    async fn set_enabled(&self, id: &str, enabled: bool) -> ApiResult<()> {
        debug!(job = id, enabled, "PATCH job");
        let response = self
            .client
            .patch(self.url(&format!("jobs/{}", id)))
            .json(&serde_json::json!({ "enabled": enabled }))
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    async fn delete_job(&self, id: &str) -> ApiResult<()> {
        debug!(job = id, "DELETE job");
        let response = self
            .client
            .delete(self.url(&format!("jobs/{}", id)))
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }
}
