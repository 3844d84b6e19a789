mod base;
mod memory;

pub use base::Publisher;
pub use memory::{MemoryPublisher, PublishedMessage};
