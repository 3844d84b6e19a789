//! Copy listing and split planning.
//!
//! The listing is produced by an external pass over the source objects and is
//! only ever read sequentially. [`ListingSplitter`] turns it into byte ranges
//! that copy workers read back independently with [`ListingReader::read_split`].

mod entry;
mod format;
mod splitter;

pub use entry::{ListingEntry, ListingSummary, Split};
pub use format::{LISTING_HEADER_BYTES, ListingReader, ListingWriter};
pub use splitter::ListingSplitter;

use std::path::Path;

use crate::error::ReplicaResult;

/// Reads the entries of one split from the listing file at `path`.
pub fn read_split(path: &Path, split: &Split) -> ReplicaResult<Vec<ListingEntry>> {
    ListingReader::open(path)?.read_split(split)
}
