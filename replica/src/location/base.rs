use std::future::Future;

use crate::error::ReplicaResult;
use crate::location::path::Location;

/// Maps source storage locations to paths relative to the source table root.
pub trait SourceLocationResolver {
    /// Returns the sub path of `location` below the source table location.
    fn sub_path_of(&self, location: &Location) -> ReplicaResult<String>;
}

/// Receives the replica locations that must be deleted once a run is over.
///
/// Implementations typically persist the locations so that a housekeeping
/// process can remove them later. Deleting a location twice must be harmless,
/// the same location can be handed over more than once.
pub trait CleanupSink {
    fn add_cleanup_location(
        &self,
        partition_event_key: &str,
        location: &Location,
    ) -> impl Future<Output = ReplicaResult<()>> + Send;
}

/// Listens to changes of replica locations in the replica catalog.
pub trait ReplicaCatalogListener {
    /// Called with the locations a run no longer references, in recording order.
    fn deprecated_replica_locations(
        &self,
        locations: &[Location],
    ) -> impl Future<Output = ReplicaResult<()>> + Send;
}
