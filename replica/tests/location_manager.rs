#![cfg(feature = "test-utils")]

use replica::location::{
    Location, ReplicaLocationManager, SourcePartition, TableRootResolver, TableType,
};
use replica::test_utils::location::{RecordingCatalogListener, RecordingCleanupSink};
use replica_telemetry::tracing::init_test_tracing;

#[tokio::test(flavor = "multi_thread")]
async fn partitioned_run_replaces_previous_partition_locations() {
    init_test_tracing();

    let sink = RecordingCleanupSink::new();
    let listener = RecordingCatalogListener::new();
    let mut manager = ReplicaLocationManager::new(
        TableRootResolver::new(Location::new("s3://source/db/table")),
        Location::new("s3://replica/db/table"),
        "ctp-20180101T000000.000Z-abc",
        TableType::Partitioned,
        sink.clone(),
        listener.clone(),
    );

    let partitions = [
        SourcePartition::new(
            vec!["2018-01-01".to_string(), "0".to_string()],
            Location::new("s3://source/db/table/local_date=2018-01-01/local_hour=0"),
        ),
        SourcePartition::new(
            vec!["2018-01-01".to_string(), "1".to_string()],
            Location::new("s3://source/db/table/local_date=2018-01-01/local_hour=1/"),
        ),
    ];

    let mut replica_locations = Vec::new();
    for partition in &partitions {
        replica_locations.push(manager.partition_location(partition).unwrap());
    }
    assert_eq!(
        replica_locations,
        vec![
            Location::new(
                "s3://replica/db/table/ctp-20180101T000000.000Z-abc/local_date=2018-01-01/local_hour=0"
            ),
            Location::new(
                "s3://replica/db/table/ctp-20180101T000000.000Z-abc/local_date=2018-01-01/local_hour=1"
            ),
        ]
    );

    // Locations of the previous run are deprecated once the new ones are live.
    let previous = Location::new("s3://replica/db/table/ctp-previous/local_date=2018-01-01");
    manager.add_cleanup_location("db.table/local_date=2018-01-01", previous.clone());
    manager.clean_up_locations().await.unwrap();

    assert_eq!(
        sink.recorded().await,
        vec![("db.table/local_date=2018-01-01".to_string(), previous.clone())]
    );
    assert_eq!(listener.deprecated().await, vec![vec![previous]]);
}

#[tokio::test(flavor = "multi_thread")]
async fn partition_outside_source_table_is_rejected() {
    init_test_tracing();

    let manager = ReplicaLocationManager::new(
        TableRootResolver::new(Location::new("s3://source/db/table")),
        Location::new("s3://replica/db/table"),
        "event",
        TableType::Partitioned,
        RecordingCleanupSink::new(),
        RecordingCatalogListener::new(),
    );

    let partition = SourcePartition::new(
        vec!["2018-01-01".to_string()],
        Location::new("s3://elsewhere/local_date=2018-01-01"),
    );

    let err = manager.partition_location(&partition).unwrap_err();
    assert_eq!(err.kind(), replica::error::ErrorKind::InvalidLocation);
}
