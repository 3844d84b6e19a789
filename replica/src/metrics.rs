use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge};

static REGISTER_METRICS: Once = Once::new();

pub const REPLICA_SPLITS_PLANNED: &str = "replica_splits_planned";
pub const REPLICA_CLEANUP_LOCATIONS_TOTAL: &str = "replica_cleanup_locations_total";
pub const REPLICA_NOTIFICATIONS_PUBLISHED_TOTAL: &str = "replica_notifications_published_total";
pub const REPLICA_NOTIFICATIONS_TRUNCATED_TOTAL: &str = "replica_notifications_truncated_total";
pub const REPLICA_PUBLISH_FAILURES_TOTAL: &str = "replica_publish_failures_total";
pub const MESSAGE_TYPE: &str = "type";

/// Describes the metrics emitted by the replication core.
///
/// Safe to call any number of times, the descriptions are registered once.
pub(crate) fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_gauge!(
            REPLICA_SPLITS_PLANNED,
            Unit::Count,
            "Number of copy splits produced by the last planning pass"
        );

        describe_counter!(
            REPLICA_CLEANUP_LOCATIONS_TOTAL,
            Unit::Count,
            "Total number of replica locations handed over for cleanup"
        );

        describe_counter!(
            REPLICA_NOTIFICATIONS_PUBLISHED_TOTAL,
            Unit::Count,
            "Total number of lifecycle notifications published, by message type"
        );

        describe_counter!(
            REPLICA_NOTIFICATIONS_TRUNCATED_TOTAL,
            Unit::Count,
            "Total number of notifications whose partition list was dropped to fit the channel"
        );

        describe_counter!(
            REPLICA_PUBLISH_FAILURES_TOTAL,
            Unit::Count,
            "Total number of lifecycle notifications that could not be published"
        );
    });
}
