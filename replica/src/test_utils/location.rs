use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::bail;
use crate::error::{ErrorKind, ReplicaResult};
use crate::location::{CleanupSink, Location, ReplicaCatalogListener};

#[derive(Debug, Default)]
struct SinkInner {
    recorded: Vec<(String, Location)>,
    failing_keys: HashSet<String>,
}

/// Cleanup sink recording every location it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingCleanupSink {
    inner: Arc<Mutex<SinkInner>>,
}

impl RecordingCleanupSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every location registered under `partition_event_key` fail.
    pub async fn fail_on_key(&self, partition_event_key: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.failing_keys.insert(partition_event_key.into());
    }

    /// Returns the accepted locations in the order they were received.
    pub async fn recorded(&self) -> Vec<(String, Location)> {
        let inner = self.inner.lock().await;
        inner.recorded.clone()
    }
}

impl CleanupSink for RecordingCleanupSink {
    async fn add_cleanup_location(
        &self,
        partition_event_key: &str,
        location: &Location,
    ) -> ReplicaResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.failing_keys.contains(partition_event_key) {
            bail!(
                ErrorKind::CleanupFailed,
                "Cleanup location rejected",
                format!("{partition_event_key}: {location}")
            );
        }

        inner
            .recorded
            .push((partition_event_key.to_owned(), location.clone()));

        Ok(())
    }
}

#[derive(Debug, Default)]
struct ListenerInner {
    deprecated: Vec<Vec<Location>>,
    failing: bool,
}

/// Catalog listener recording every batch of deprecated locations.
#[derive(Debug, Clone, Default)]
pub struct RecordingCatalogListener {
    inner: Arc<Mutex<ListenerInner>>,
}

impl RecordingCatalogListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail without recording anything.
    pub async fn fail(&self) {
        let mut inner = self.inner.lock().await;
        inner.failing = true;
    }

    pub async fn deprecated(&self) -> Vec<Vec<Location>> {
        let inner = self.inner.lock().await;
        inner.deprecated.clone()
    }
}

impl ReplicaCatalogListener for RecordingCatalogListener {
    async fn deprecated_replica_locations(&self, locations: &[Location]) -> ReplicaResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.failing {
            bail!(
                ErrorKind::IoError,
                "Replica metastore is unreachable",
                format!("{} locations", locations.len())
            );
        }

        inner.deprecated.push(locations.to_vec());

        Ok(())
    }
}
