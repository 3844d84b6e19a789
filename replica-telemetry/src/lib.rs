//! Logging setup shared by every replication process and by the test suites.

pub mod tracing;
