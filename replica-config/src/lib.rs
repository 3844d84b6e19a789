//! Configuration management for table replication.
//!
//! Provides environment detection, configuration loading from YAML files and
//! environment variables, and the shared configuration types consumed by the
//! split planner and the replication notifier.

mod environment;
mod load;
pub mod shared;

pub use environment::*;
pub use load::*;
