use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ReplicaResult;

/// Version of the notification format understood by consumers.
pub const PROTOCOL_VERSION: &str = "1.2";

/// Lifecycle event carried by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Start,
    Success,
    Failure,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Start => "START",
            MessageType::Success => "SUCCESS",
            MessageType::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A replication lifecycle notification.
///
/// Field order is the wire order, absent optional fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationMessage {
    pub protocol_version: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub headers: BTreeMap<String, String>,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub event_id: String,
    pub source_catalog: String,
    pub replica_catalog: String,
    pub source_table: String,
    pub replica_table: String,
    pub replica_table_location: String,
    pub replica_metastore_uris: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_keys: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_partitions: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_replicated: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_truncated: Option<bool>,
}

/// A serialized notification ready to be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    pub body: String,
    pub truncated: bool,
}

impl ReplicationMessage {
    /// Serializes the message, dropping the modified partitions when the
    /// payload exceeds `max_size_bytes`.
    ///
    /// The modified partitions are the only unbounded field. A message still
    /// too large after dropping them is returned as is and left to the channel.
    pub fn encode(mut self, max_size_bytes: usize) -> ReplicaResult<EncodedMessage> {
        let body = to_json(&self)?;
        if body.len() <= max_size_bytes || self.modified_partitions.is_none() {
            return Ok(EncodedMessage {
                body,
                truncated: false,
            });
        }

        self.modified_partitions = None;
        self.message_truncated = Some(true);

        Ok(EncodedMessage {
            body: to_json(&self)?,
            truncated: true,
        })
    }
}

fn to_json(message: &ReplicationMessage) -> ReplicaResult<String> {
    Ok(serde_json::to_string(message)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_message() -> ReplicationMessage {
        ReplicationMessage {
            protocol_version: PROTOCOL_VERSION.to_string(),
            message_type: MessageType::Start,
            headers: BTreeMap::from([("pipelineId".to_string(), "0943".to_string())]),
            start_time: "starttime".to_string(),
            end_time: None,
            event_id: "event-id".to_string(),
            source_catalog: "sourceCatalogName".to_string(),
            replica_catalog: "replicaCatalogName".to_string(),
            source_table: "srcDb.srcTable".to_string(),
            replica_table: "replicaDb.replicaTable".to_string(),
            replica_table_location: "s3://bucket/path".to_string(),
            replica_metastore_uris: "thrift://host:9083".to_string(),
            partition_keys: None,
            modified_partitions: None,
            bytes_replicated: None,
            error_message: None,
            message_truncated: None,
        }
    }

    #[test]
    fn start_message_omits_absent_fields() {
        let encoded = start_message().encode(usize::MAX).unwrap();

        assert_eq!(
            encoded.body,
            "{\"protocolVersion\":\"1.2\",\"type\":\"START\",\
             \"headers\":{\"pipelineId\":\"0943\"},\"startTime\":\"starttime\",\
             \"eventId\":\"event-id\",\"sourceCatalog\":\"sourceCatalogName\",\
             \"replicaCatalog\":\"replicaCatalogName\",\"sourceTable\":\"srcDb.srcTable\",\
             \"replicaTable\":\"replicaDb.replicaTable\",\
             \"replicaTableLocation\":\"s3://bucket/path\",\
             \"replicaMetastoreUris\":\"thrift://host:9083\"}"
        );
        assert!(!encoded.truncated);
    }

    #[test]
    fn oversized_message_drops_modified_partitions() {
        let mut message = start_message();
        message.message_type = MessageType::Success;
        message.end_time = Some("endtime".to_string());
        message.partition_keys = Some(IndexMap::from([(
            "local_date".to_string(),
            "string".to_string(),
        )]));
        message.modified_partitions = Some(vec![vec!["2014-01-01".to_string()]; 1000]);
        message.bytes_replicated = Some(42);

        let encoded = message.encode(1024).unwrap();
        assert!(encoded.truncated);

        let decoded: ReplicationMessage = serde_json::from_str(&encoded.body).unwrap();
        assert_eq!(decoded.modified_partitions, None);
        assert_eq!(decoded.message_truncated, Some(true));
        assert_eq!(decoded.bytes_replicated, Some(42));
        assert!(decoded.partition_keys.is_some());
        assert!(encoded.body.ends_with("\"bytesReplicated\":42,\"messageTruncated\":true}"));
    }

    #[test]
    fn oversized_message_without_partitions_is_kept() {
        let encoded = start_message().encode(10).unwrap();

        assert!(!encoded.truncated);
        assert!(!encoded.body.contains("messageTruncated"));
    }
}
