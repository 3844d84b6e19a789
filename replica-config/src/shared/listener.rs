use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Largest message body accepted by the notification channel, 256 KiB.
pub const DEFAULT_MAX_MESSAGE_SIZE_BYTES: usize = 256 * 1024;

/// Settings of the replication lifecycle notifications.
///
/// Each lifecycle event goes to its own topic when one is configured and to the
/// default `topic` otherwise.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Default topic for every lifecycle event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_topic: Option<String>,
    /// Subject attached to every published message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Static headers copied into every message.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Maximum serialized size of a message before the partition list is dropped.
    #[serde(default = "default_max_message_size_bytes")]
    pub max_message_size_bytes: usize,
}

fn default_max_message_size_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_SIZE_BYTES
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            topic: None,
            start_topic: None,
            success_topic: None,
            fail_topic: None,
            subject: None,
            headers: BTreeMap::new(),
            max_message_size_bytes: DEFAULT_MAX_MESSAGE_SIZE_BYTES,
        }
    }
}

impl ListenerConfig {
    /// Creates a configuration publishing every event to `topic`.
    pub fn with_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Default::default()
        }
    }

    pub fn start_topic(&self) -> Option<&str> {
        self.start_topic.as_deref().or(self.topic.as_deref())
    }

    pub fn success_topic(&self) -> Option<&str> {
        self.success_topic.as_deref().or(self.topic.as_deref())
    }

    pub fn fail_topic(&self) -> Option<&str> {
        self.fail_topic.as_deref().or(self.topic.as_deref())
    }

    /// Checks that every lifecycle event resolves to a topic.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start_topic().is_none() {
            return Err(ValidationError::MissingTopic("start"));
        }
        if self.success_topic().is_none() {
            return Err(ValidationError::MissingTopic("success"));
        }
        if self.fail_topic().is_none() {
            return Err(ValidationError::MissingTopic("fail"));
        }
        if self.max_message_size_bytes == 0 {
            return Err(ValidationError::MaxMessageSizeZero);
        }

        Ok(())
    }
}
