//! Synthetic job events for demo mode

use super::bus::{JobEventFrame, JobStatusUpdate, Topic, TopicRegistry};
use crate::api::{DemoJobsApi, JobStatus};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Periodically flip a random demo job's status and publish the change
pub fn spawn_demo_feed(
    registry: TopicRegistry,
    api: Arc<DemoJobsApi>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            let ids = api.job_ids().await;
            let (job_id, status) = {
                let mut rng = rand::thread_rng();
                let Some(job_id) = ids.choose(&mut rng).cloned() else {
                    continue;
                };
                let status = match rng.gen_range(0..10) {
                    0..=4 => JobStatus::Running,
                    5..=8 => JobStatus::Succeeded,
                    _ => JobStatus::Failed,
                };
                (job_id, status)
            };

            if let Err(e) = api.set_status(&job_id, status).await {
                debug!(job = %job_id, error = %e, "Demo job vanished before update");
                continue;
            }

            let topic = match status {
                JobStatus::Running => Topic::JobStarted,
                _ => Topic::JobFinished,
            };
            let update = JobStatusUpdate { job_id, status };

            // Travel as text like a real backend frame
            let text = JobEventFrame::new(topic, &update)
                .and_then(|frame| Ok(serde_json::to_string(&frame)?));
            match text {
                Ok(text) => {
                    if let Err(e) = registry.dispatch_raw(&text) {
                        warn!(error = %e, "Failed to dispatch demo frame");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to encode demo frame"),
            }
            registry.publish(Topic::JobStatus, update);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_publishes_status_updates() {
        let registry = TopicRegistry::new();
        let mut sub = registry.subscribe(Topic::JobStatus);
        let api = Arc::new(DemoJobsApi::seeded(3));

        let handle = spawn_demo_feed(registry.clone(), Arc::clone(&api), Duration::from_millis(5));
        let update = tokio::time::timeout(Duration::from_secs(2), sub.next())
            .await
            .unwrap()
            .unwrap();
        handle.abort();

        assert!(api.job_ids().await.contains(&update.job_id));
    }

    #[tokio::test]
    async fn test_feed_sends_started_or_finished_frames() {
        let registry = TopicRegistry::new();
        let mut started = registry.subscribe(Topic::JobStarted);
        let mut finished = registry.subscribe(Topic::JobFinished);
        let api = Arc::new(DemoJobsApi::seeded(3));

        let handle = spawn_demo_feed(registry.clone(), Arc::clone(&api), Duration::from_millis(5));
        let update = tokio::time::timeout(Duration::from_secs(2), async {
            tokio::select! {
                update = started.next() => update,
                update = finished.next() => update,
            }
        })
        .await
        .unwrap()
        .unwrap();
        handle.abort();

        assert_ne!(update.status, JobStatus::Idle);
    }
}
