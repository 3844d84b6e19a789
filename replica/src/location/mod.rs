//! Replica location management.
//!
//! Computes where tables and partitions land on the replica side and tracks
//! the locations to delete once a run is over.

mod base;
mod manager;
mod path;
mod resolver;

pub use base::{CleanupSink, ReplicaCatalogListener, SourceLocationResolver};
pub use manager::{CleanupEntry, ReplicaLocationManager, SourcePartition, TableType};
pub use path::Location;
pub use resolver::TableRootResolver;
