use std::sync::Arc;
use tokio::sync::Mutex;

use crate::bail;
use crate::error::{ErrorKind, ReplicaResult};
use crate::publisher::Publisher;

/// Publisher whose every publish attempt fails.
#[derive(Debug, Clone, Default)]
pub struct FailingPublisher {
    attempts: Arc<Mutex<usize>>,
}

impl FailingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of publish attempts so far.
    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

impl Publisher for FailingPublisher {
    async fn publish(&self, topic: &str, _subject: Option<&str>, _body: String) -> ReplicaResult<()> {
        let mut attempts = self.attempts.lock().await;
        *attempts += 1;

        bail!(
            ErrorKind::PublishFailed,
            "Messaging channel is unavailable",
            topic
        );
    }
}
