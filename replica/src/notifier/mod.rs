mod clock;
mod lifecycle;
mod message;
mod partitions;
mod table;

pub use clock::{Clock, SystemClock};
pub use lifecycle::ReplicationNotifier;
pub use message::{EncodedMessage, MessageType, PROTOCOL_VERSION, ReplicationMessage};
pub use partitions::{EventPartition, EventPartitions, PartitionDiff};
pub use table::TableReplication;
