//! Test doubles for the collaborators of the replication core.
//!
//! A scripted clock for deterministic timestamps, recording cleanup sinks and
//! catalog listeners, and a publisher that always fails.
pub mod clock;
pub mod location;
pub mod publisher;
