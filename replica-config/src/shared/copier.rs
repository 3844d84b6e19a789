use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Settings of the parallel copy phase.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CopierConfig {
    /// Path of the serialized listing of objects to copy.
    pub listing_path: PathBuf,
    /// Number of parallel copy units to plan.
    ///
    /// Zero means no copy work is planned at all.
    #[serde(default = "default_num_splits")]
    pub num_splits: u32,
}

fn default_num_splits() -> u32 {
    20
}

impl CopierConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listing_path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyListingPath);
        }

        Ok(())
    }
}
