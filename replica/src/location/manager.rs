use metrics::counter;
use tracing::{debug, info, warn};

use crate::bail;
use crate::error::{ErrorKind, ReplicaError, ReplicaResult};
use crate::location::base::{CleanupSink, ReplicaCatalogListener, SourceLocationResolver};
use crate::location::path::Location;
use crate::metrics::{REPLICA_CLEANUP_LOCATIONS_TOTAL, register_metrics};
use crate::replica_error;

/// Whether the replicated table is partitioned.
///
/// Fixed for the lifetime of a [`ReplicaLocationManager`], it decides which
/// location operations are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableType {
    Partitioned,
    Unpartitioned,
}

/// A partition of the source table as read from the source catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePartition {
    /// Partition key values, in partition key order.
    pub values: Vec<String>,
    /// Storage location, absent when the catalog entry has none.
    pub location: Option<Location>,
}

impl SourcePartition {
    pub fn new(values: Vec<String>, location: Location) -> Self {
        Self {
            values,
            location: Some(location),
        }
    }
}

/// A replica location to delete once the run is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupEntry {
    pub partition_event_key: String,
    pub location: Location,
}

/// Computes replica locations for one run of one table.
///
/// Every run writes below its own `event_id` directory: unpartitioned tables
/// at `base/event_id`, partitions at `base/event_id/<source sub path>`. A
/// failed run therefore never collides with a retry, and deleting a run's
/// output never touches a concurrent replication of the same table.
///
/// A manager is owned by the task that aggregates the results of the copy
/// workers and is discarded after the run.
#[derive(Debug)]
pub struct ReplicaLocationManager<R, C, L> {
    resolver: R,
    table_base_path: Location,
    event_id: String,
    table_type: TableType,
    cleanup_sink: C,
    catalog_listener: L,
    cleanup_locations: Vec<CleanupEntry>,
}

impl<R, C, L> ReplicaLocationManager<R, C, L>
where
    R: SourceLocationResolver,
    C: CleanupSink + Sync,
    L: ReplicaCatalogListener + Sync,
{
    pub fn new(
        resolver: R,
        table_base_path: Location,
        event_id: impl Into<String>,
        table_type: TableType,
        cleanup_sink: C,
        catalog_listener: L,
    ) -> Self {
        register_metrics();

        Self {
            resolver,
            table_base_path,
            event_id: event_id.into(),
            table_type,
            cleanup_sink,
            catalog_listener,
            cleanup_locations: Vec::new(),
        }
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Location registered for the replica table in the replica catalog.
    ///
    /// Partitioned tables keep the base path, their isolation happens per
    /// partition.
    pub fn table_location(&self) -> Location {
        match self.table_type {
            TableType::Unpartitioned => self.table_base_path.join(&self.event_id),
            TableType::Partitioned => self.table_base_path.clone(),
        }
    }

    /// Directory holding every partition written by this run.
    pub fn partition_base_location(&self) -> ReplicaResult<Location> {
        self.ensure_partitioned("partition_base_location")?;

        Ok(self.table_base_path.join(&self.event_id))
    }

    /// Replica location of `source_partition`, mirroring its layout below the
    /// source table.
    pub fn partition_location(&self, source_partition: &SourcePartition) -> ReplicaResult<Location> {
        self.ensure_partitioned("partition_location")?;

        let Some(source_location) = &source_partition.location else {
            bail!(
                ErrorKind::InvalidLocation,
                "Source partition has no storage location",
                format!("{:?}", source_partition.values)
            );
        };

        let sub_path = self.resolver.sub_path_of(source_location)?;
        let location = self.partition_base_location()?.join(sub_path);
        debug!(%source_location, %location, "resolved replica partition location");

        Ok(location)
    }

    /// Records `location` for deletion. Repeated keys accumulate.
    pub fn add_cleanup_location(&mut self, partition_event_key: impl Into<String>, location: Location) {
        self.cleanup_locations.push(CleanupEntry {
            partition_event_key: partition_event_key.into(),
            location,
        });
    }

    pub fn cleanup_locations(&self) -> &[CleanupEntry] {
        &self.cleanup_locations
    }

    /// Hands every recorded location to the cleanup sink, in recording order,
    /// then reports them to the catalog listener as deprecated.
    ///
    /// A failing entry does not stop the flush of the following ones, all the
    /// failures are returned together. The recorded entries are kept.
    pub async fn clean_up_locations(&self) -> ReplicaResult<()> {
        if self.cleanup_locations.is_empty() {
            debug!(event_id = %self.event_id, "no replica locations to clean up");
            return Ok(());
        }

        let mut errors = Vec::new();
        for entry in &self.cleanup_locations {
            if let Err(err) = self
                .cleanup_sink
                .add_cleanup_location(&entry.partition_event_key, &entry.location)
                .await
            {
                warn!(
                    key = %entry.partition_event_key,
                    location = %entry.location,
                    error = %err,
                    "failed to register cleanup location"
                );
                errors.push(err);
            }
        }

        let flushed = self.cleanup_locations.len() - errors.len();
        counter!(REPLICA_CLEANUP_LOCATIONS_TOTAL).increment(flushed as u64);
        info!(
            event_id = %self.event_id,
            flushed,
            failed = errors.len(),
            "registered replica cleanup locations"
        );

        let deprecated: Vec<Location> = self
            .cleanup_locations
            .iter()
            .map(|entry| entry.location.clone())
            .collect();
        if let Err(err) = self
            .catalog_listener
            .deprecated_replica_locations(&deprecated)
            .await
        {
            warn!(event_id = %self.event_id, error = %err, "failed to report deprecated replica locations");
            errors.push(replica_error!(
                ErrorKind::CatalogListenerFailed,
                "Replica catalog listener rejected the deprecated locations",
                err
            ));
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ReplicaError::many(errors)),
        }
    }

    fn ensure_partitioned(&self, operation: &'static str) -> ReplicaResult<()> {
        match self.table_type {
            TableType::Partitioned => Ok(()),
            TableType::Unpartitioned => Err(replica_error!(
                ErrorKind::UnsupportedOperation,
                "Operation is only supported on partitioned tables",
                operation
            )),
        }
    }
}
