pub mod error;
pub mod listing;
pub mod location;
mod macros;
pub mod metrics;
pub mod notifier;
pub mod publisher;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
