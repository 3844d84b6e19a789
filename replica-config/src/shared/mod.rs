mod base;
mod catalog;
mod copier;
mod listener;
mod replication;

pub use base::*;
pub use catalog::*;
pub use copier::*;
pub use listener::*;
pub use replication::*;
