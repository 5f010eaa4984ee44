//! Topic-keyed publish/subscribe for backend job events
//!
//! The backend pushes frames of the form `{"id": "<topic>", "data": "<json>"}`.
//! Components subscribe to the topics they care about and receive decoded
//! updates through a [`Subscription`]. Dropping a subscription removes it from
//! the registry, so listeners never outlive the component that owns them.

use crate::api::JobStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum BusError {
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Job event topic. Frames carry its wire name as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    JobStarted,
    JobFinished,
    JobStatus,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::JobStarted, Topic::JobFinished, Topic::JobStatus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::JobStarted => "job-started",
            Topic::JobFinished => "job-finished",
            Topic::JobStatus => "job-status",
        }
    }

    pub fn parse(name: &str) -> Result<Self, BusError> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str() == name)
            .ok_or_else(|| BusError::UnknownTopic(name.to_string()))
    }
}

/// Raw frame as carried by the backend event channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEventFrame {
    /// Topic name
    pub id: String,
    /// JSON-encoded payload
    pub data: String,
}

/// Decoded payload of every job topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusUpdate {
    pub job_id: String,
    pub status: JobStatus,
}

impl JobEventFrame {
    pub fn new(topic: Topic, update: &JobStatusUpdate) -> Result<Self, BusError> {
        Ok(Self {
            id: topic.as_str().to_string(),
            data: serde_json::to_string(update)?,
        })
    }

    pub fn decode(&self) -> Result<(Topic, JobStatusUpdate), BusError> {
        let topic = Topic::parse(&self.id)?;
        let update = serde_json::from_str(&self.data)?;
        Ok((topic, update))
    }
}

type Subscribers = HashMap<Topic, Vec<(u64, mpsc::UnboundedSender<JobStatusUpdate>)>>;

/// Shared registry of topic subscribers
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    subscribers: Arc<Mutex<Subscribers>>,
    next_id: Arc<AtomicU64>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock().entry(topic).or_default().push((id, sender));
        debug!(topic = topic.as_str(), subscriber = id, "Subscribed");

        Subscription {
            id,
            topic,
            receiver,
            registry: self.clone(),
        }
    }

    /// Deliver an update to every subscriber of `topic`. Returns the number reached.
    pub fn publish(&self, topic: Topic, update: JobStatusUpdate) -> usize {
        let mut subscribers = self.lock();
        let Some(entries) = subscribers.get_mut(&topic) else {
            return 0;
        };
        entries.retain(|(_, sender)| sender.send(update.clone()).is_ok());
        trace!(topic = topic.as_str(), delivered = entries.len(), "Published");
        entries.len()
    }

    pub fn dispatch(&self, frame: &JobEventFrame) -> Result<usize, BusError> {
        let (topic, update) = frame.decode()?;
        Ok(self.publish(topic, update))
    }

    /// Decode and dispatch a frame received as text
    pub fn dispatch_raw(&self, text: &str) -> Result<usize, BusError> {
        let frame: JobEventFrame = serde_json::from_str(text)?;
        self.dispatch(&frame)
    }

    fn unsubscribe(&self, topic: Topic, id: u64) {
        let mut subscribers = self.lock();
        if let Some(entries) = subscribers.get_mut(&topic) {
            entries.retain(|(entry, _)| *entry != id);
            if entries.is_empty() {
                subscribers.remove(&topic);
            }
        }
        debug!(topic = topic.as_str(), subscriber = id, "Unsubscribed");
    }
}

/// Live subscription to one topic, released on drop
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    topic: Topic,
    receiver: mpsc::UnboundedReceiver<JobStatusUpdate>,
    registry: TopicRegistry,
}

impl Subscription {
    /// Next pending update, without waiting
    pub fn try_next(&mut self) -> Option<JobStatusUpdate> {
        self.receiver.try_recv().ok()
    }

    pub async fn next(&mut self) -> Option<JobStatusUpdate> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.topic, self.id);
    }
}
