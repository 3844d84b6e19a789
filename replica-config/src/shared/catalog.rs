use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Catalog the tables are read from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceCatalogConfig {
    /// Name reported as `sourceCatalog` in notifications.
    pub name: String,
}

impl SourceCatalogConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyCatalogName("source_catalog"));
        }

        Ok(())
    }
}

/// Catalog the tables are replicated into.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplicaCatalogConfig {
    /// Name reported as `replicaCatalog` in notifications.
    pub name: String,
    /// Metastore addresses of the replica catalog, reported as `replicaMetastoreUris`.
    #[serde(default)]
    pub metastore_uris: String,
}

impl ReplicaCatalogConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyCatalogName("replica_catalog"));
        }

        Ok(())
    }
}
