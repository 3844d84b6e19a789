use serde::{Deserialize, Serialize};

/// One object of the copy listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Path of the object relative to the source table root.
    pub relative_path: String,
    /// Size of the object in bytes.
    pub byte_length: u64,
    /// Byte offset of the record within the serialized listing.
    pub sequence_position: u64,
}

/// Totals of a written listing, the input the split planner needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingSummary {
    pub entries: u64,
    pub total_bytes: u64,
}

/// A contiguous byte range of the serialized listing assigned to one copy worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub start_offset: u64,
    pub length: u64,
}

impl Split {
    /// Offset just past the last record of the split, `None` when the range
    /// does not fit in a `u64`.
    pub fn end_offset(&self) -> Option<u64> {
        self.start_offset.checked_add(self.length)
    }
}
