use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use metrics::counter;
use replica_config::shared::ListenerConfig;
use tokio::sync::{Mutex as RunMutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use crate::error::{ErrorKind, ReplicaResult};
use crate::metrics::{
    MESSAGE_TYPE, REPLICA_NOTIFICATIONS_PUBLISHED_TOTAL, REPLICA_NOTIFICATIONS_TRUNCATED_TOTAL,
    REPLICA_PUBLISH_FAILURES_TOTAL, register_metrics,
};
use crate::notifier::clock::Clock;
use crate::notifier::message::{MessageType, ReplicationMessage};
use crate::notifier::partitions::{EventPartitions, PartitionDiff};
use crate::notifier::table::TableReplication;
use crate::publisher::Publisher;
use crate::replica_error;

#[derive(Debug, Default)]
struct RunState {
    start_time: Option<String>,
    diff: PartitionDiff,
    bytes_replicated: Option<u64>,
    /// Set once the terminal event went through, the handle is then stale.
    finished: bool,
}

type RunHandle = Arc<RunMutex<RunState>>;

/// Publishes START, SUCCESS and FAILURE notifications for replication runs.
///
/// State is kept per `event_id` between the start of a run and its terminal
/// event, then discarded. Calls for the same run are serialized, different runs
/// proceed independently.
#[derive(Debug)]
pub struct ReplicationNotifier<P, C> {
    config: Arc<ListenerConfig>,
    publisher: P,
    clock: C,
    runs: Mutex<HashMap<String, RunHandle>>,
}

impl<P, C> ReplicationNotifier<P, C>
where
    P: Publisher + Sync,
    C: Clock + Sync,
{
    /// Creates a notifier, failing when a lifecycle topic cannot be resolved.
    pub fn new(config: Arc<ListenerConfig>, publisher: P, clock: C) -> ReplicaResult<Self> {
        config.validate()?;
        register_metrics();

        Ok(Self {
            config,
            publisher,
            clock,
            runs: Mutex::new(HashMap::new()),
        })
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Number of runs with buffered state.
    pub fn active_runs(&self) -> usize {
        self.runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub async fn start(&self, replication: &TableReplication, event_id: &str) -> ReplicaResult<()> {
        let start_time = {
            let mut run = self.lock_run(event_id).await;
            let start_time = self.clock.now();
            run.start_time = Some(start_time.clone());
            start_time
        };

        info!(
            event_id,
            source_table = %replication.source_table,
            replica_table = %replication.replica_table,
            "replication started"
        );

        let message = replication.message(
            MessageType::Start,
            &self.config.headers,
            event_id,
            start_time,
        );
        self.publish(message).await
    }

    pub async fn record_created_partitions(&self, event_id: &str, partitions: EventPartitions) {
        let mut run = self.lock_run(event_id).await;
        debug!(event_id, count = partitions.len(), "recording created partitions");
        run.diff.record_created(partitions);
    }

    pub async fn record_altered_partitions(&self, event_id: &str, partitions: EventPartitions) {
        let mut run = self.lock_run(event_id).await;
        debug!(event_id, count = partitions.len(), "recording altered partitions");
        run.diff.record_altered(partitions);
    }

    /// Records the amount of data the copier moved for the run.
    pub async fn record_copier_end(&self, event_id: &str, bytes_replicated: u64) {
        let mut run = self.lock_run(event_id).await;
        debug!(event_id, bytes_replicated, "recording copier end");
        run.bytes_replicated = Some(bytes_replicated);
    }

    pub async fn success(&self, replication: &TableReplication, event_id: &str) -> ReplicaResult<()> {
        self.finish(replication, event_id, MessageType::Success, None)
            .await
    }

    pub async fn failure<E>(
        &self,
        replication: &TableReplication,
        event_id: &str,
        error: &E,
    ) -> ReplicaResult<()>
    where
        E: fmt::Display + Sync + ?Sized,
    {
        let error_message = error.to_string();
        self.finish(
            replication,
            event_id,
            MessageType::Failure,
            Some(error_message),
        )
        .await
    }

    async fn finish(
        &self,
        replication: &TableReplication,
        event_id: &str,
        message_type: MessageType,
        error_message: Option<String>,
    ) -> ReplicaResult<()> {
        let (start_time, end_time, state) = {
            let mut run = self.lock_run(event_id).await;

            // Without a recorded start the run is reported from this call alone.
            let start_time = match run.start_time.take() {
                Some(start_time) => start_time,
                None => self.clock.now(),
            };
            let end_time = self.clock.now();

            let state = mem::take(&mut *run);
            run.finished = true;
            self.remove_run(event_id, OwnedMutexGuard::mutex(&run));

            (start_time, end_time, state)
        };

        match &error_message {
            Some(error_message) => info!(event_id, error = %error_message, "replication failed"),
            None => info!(event_id, "replication succeeded"),
        }

        let mut message = replication.message(
            message_type,
            &self.config.headers,
            event_id,
            start_time,
        );
        message.end_time = Some(end_time);
        message.partition_keys = state.diff.partition_keys().cloned();
        message.modified_partitions = state.diff.modified_partitions();
        message.bytes_replicated = Some(state.bytes_replicated.unwrap_or(0));
        message.error_message = error_message;

        self.publish(message).await
    }

    async fn publish(&self, message: ReplicationMessage) -> ReplicaResult<()> {
        let message_type = message.message_type;
        let event_id = message.event_id.clone();
        let topic = self.topic(message_type)?;

        let encoded = message.encode(self.config.max_message_size_bytes)?;
        if encoded.truncated {
            warn!(
                %event_id,
                max_message_size_bytes = self.config.max_message_size_bytes,
                "notification too large, dropped the modified partitions"
            );
            counter!(REPLICA_NOTIFICATIONS_TRUNCATED_TOTAL).increment(1);
        }

        let result = self
            .publisher
            .publish(topic, self.config.subject.as_deref(), encoded.body)
            .await;

        match result {
            Ok(()) => {
                counter!(REPLICA_NOTIFICATIONS_PUBLISHED_TOTAL, MESSAGE_TYPE => message_type.as_str())
                    .increment(1);

                Ok(())
            }
            Err(err) => {
                error!(%event_id, topic, %message_type, error = %err, "failed to publish notification");
                counter!(REPLICA_PUBLISH_FAILURES_TOTAL, MESSAGE_TYPE => message_type.as_str())
                    .increment(1);

                Err(replica_error!(
                    ErrorKind::PublishFailed,
                    "Failed to publish replication notification",
                    err
                ))
            }
        }
    }

    fn topic(&self, message_type: MessageType) -> ReplicaResult<&str> {
        let topic = match message_type {
            MessageType::Start => self.config.start_topic(),
            MessageType::Success => self.config.success_topic(),
            MessageType::Failure => self.config.fail_topic(),
        };

        topic.ok_or_else(|| {
            replica_error!(
                ErrorKind::ConfigError,
                "No topic configured for notification",
                message_type
            )
        })
    }

    /// Locks the state of `event_id`, creating it when the run is unknown.
    async fn lock_run(&self, event_id: &str) -> OwnedMutexGuard<RunState> {
        loop {
            let handle = {
                let mut runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(runs.entry(event_id.to_owned()).or_default())
            };

            let run = handle.lock_owned().await;
            // A terminal event won the race, retry on a fresh state.
            if !run.finished {
                return run;
            }
        }
    }

    fn remove_run(&self, event_id: &str, handle: &RunHandle) {
        let mut runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        if runs
            .get(event_id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
        {
            runs.remove(event_id);
        }
    }
}
