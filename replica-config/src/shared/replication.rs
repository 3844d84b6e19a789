use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{
    CopierConfig, ListenerConfig, ReplicaCatalogConfig, SourceCatalogConfig, ValidationError,
};

/// Complete configuration of a table replication.
///
/// Loaded once at startup through [`crate::load_config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReplicationConfig {
    pub source_catalog: SourceCatalogConfig,
    pub replica_catalog: ReplicaCatalogConfig,
    pub copier: CopierConfig,
    #[serde(default)]
    pub listener: ListenerConfig,
}

impl Config for ReplicationConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}

impl ReplicationConfig {
    /// Validates every section of the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source_catalog.validate()?;
        self.replica_catalog.validate()?;
        self.copier.validate()?;
        self.listener.validate()
    }
}
