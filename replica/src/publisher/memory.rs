use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::ReplicaResult;
use crate::publisher::base::Publisher;

/// A notification handed to a [`MemoryPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug)]
struct Inner {
    messages: Vec<PublishedMessage>,
}

/// Publisher keeping every notification in memory.
#[derive(Debug, Clone)]
pub struct MemoryPublisher {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        let inner = Inner {
            messages: Vec::new(),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Returns the published notifications in publish order.
    pub async fn messages(&self) -> Vec<PublishedMessage> {
        let inner = self.inner.lock().await;
        inner.messages.clone()
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.messages.clear();
    }
}

impl Default for MemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher for MemoryPublisher {
    async fn publish(&self, topic: &str, subject: Option<&str>, body: String) -> ReplicaResult<()> {
        let mut inner = self.inner.lock().await;
        info!(topic, "publishing notification of {} bytes", body.len());
        inner.messages.push(PublishedMessage {
            topic: topic.to_owned(),
            subject: subject.map(str::to_owned),
            body,
        });

        Ok(())
    }
}
