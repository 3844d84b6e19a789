use std::collections::BTreeMap;

use replica_config::shared::{ReplicaCatalogConfig, SourceCatalogConfig};

use crate::location::Location;
use crate::notifier::message::{MessageType, PROTOCOL_VERSION, ReplicationMessage};

/// Identifies the table a run replicates and where its replica lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReplication {
    pub source_catalog: String,
    pub replica_catalog: String,
    pub replica_metastore_uris: String,
    /// Qualified name of the source table, `database.table`.
    pub source_table: String,
    /// Qualified name of the replica table, `database.table`.
    pub replica_table: String,
    pub replica_table_location: Location,
}

impl TableReplication {
    pub fn new(
        source_catalog: &SourceCatalogConfig,
        replica_catalog: &ReplicaCatalogConfig,
        source_table: impl Into<String>,
        replica_table: impl Into<String>,
        replica_table_location: Location,
    ) -> Self {
        Self {
            source_catalog: source_catalog.name.clone(),
            replica_catalog: replica_catalog.name.clone(),
            replica_metastore_uris: replica_catalog.metastore_uris.clone(),
            source_table: source_table.into(),
            replica_table: replica_table.into(),
            replica_table_location,
        }
    }

    pub(crate) fn message(
        &self,
        message_type: MessageType,
        headers: &BTreeMap<String, String>,
        event_id: &str,
        start_time: String,
    ) -> ReplicationMessage {
        ReplicationMessage {
            protocol_version: PROTOCOL_VERSION.to_string(),
            message_type,
            headers: headers.clone(),
            start_time,
            end_time: None,
            event_id: event_id.to_owned(),
            source_catalog: self.source_catalog.clone(),
            replica_catalog: self.replica_catalog.clone(),
            source_table: self.source_table.clone(),
            replica_table: self.replica_table.clone(),
            replica_table_location: self.replica_table_location.to_string(),
            replica_metastore_uris: self.replica_metastore_uris.clone(),
            partition_keys: None,
            modified_partitions: None,
            bytes_replicated: None,
            error_message: None,
            message_truncated: None,
        }
    }
}
