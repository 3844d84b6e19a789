use std::io::Read;
use std::path::Path;

use metrics::gauge;
use replica_config::shared::CopierConfig;
use tracing::{debug, info};

use crate::bail;
use crate::error::{ErrorKind, ReplicaResult};
use crate::listing::entry::Split;
use crate::listing::format::ListingReader;
use crate::metrics::{REPLICA_SPLITS_PLANNED, register_metrics};

/// Plans the parallel copy units of a listing.
///
/// The listing is scanned once in storage order and cut into contiguous runs
/// of roughly `total_bytes / num_splits` bytes. An object is never divided:
/// one larger than the target sits alone in its split, so the number of
/// produced splits is approximate.
#[derive(Debug, Clone, Copy)]
pub struct ListingSplitter {
    num_splits: u32,
}

impl ListingSplitter {
    pub fn new(num_splits: u32) -> Self {
        register_metrics();

        Self { num_splits }
    }

    pub fn from_config(config: &CopierConfig) -> Self {
        Self::new(config.num_splits)
    }

    pub fn num_splits(&self) -> u32 {
        self.num_splits
    }

    /// Plans the listing file configured in `config`.
    pub fn plan_with_config(config: &CopierConfig, total_bytes: u64) -> ReplicaResult<Vec<Split>> {
        if config.listing_path.as_os_str().is_empty() {
            bail!(
                ErrorKind::ConfigError,
                "Could not find the listing file, no listing path configured"
            );
        }

        Self::from_config(config).plan_file(&config.listing_path, total_bytes)
    }

    /// Plans the listing file at `path`.
    pub fn plan_file(&self, path: &Path, total_bytes: u64) -> ReplicaResult<Vec<Split>> {
        if self.num_splits == 0 {
            return Ok(Vec::new());
        }

        let listing = ListingReader::open(path)?;
        self.plan(listing, total_bytes)
    }

    /// Cuts `listing` into splits of approximately equal byte size.
    pub fn plan<R: Read>(
        &self,
        mut listing: ListingReader<R>,
        total_bytes: u64,
    ) -> ReplicaResult<Vec<Split>> {
        if self.num_splits == 0 {
            return Ok(Vec::new());
        }

        if total_bytes == 0 {
            bail!(
                ErrorKind::InvalidPlan,
                "Cannot plan splits for a listing without bytes to copy",
                format!("{} splits requested", self.num_splits)
            );
        }

        let target_bytes = total_bytes.div_ceil(u64::from(self.num_splits));
        debug!(
            target_bytes,
            num_splits = self.num_splits,
            total_bytes,
            "planning copy splits"
        );

        let mut splits = Vec::new();
        let mut split_start = listing.position();
        let mut last_position = split_start;
        let mut split_bytes: u64 = 0;
        let mut split_entries: u64 = 0;

        while let Some(entry) = listing.next_entry()? {
            if split_entries > 0 && split_bytes.saturating_add(entry.byte_length) > target_bytes {
                let split = Split {
                    start_offset: split_start,
                    length: last_position - split_start,
                };
                debug!(?split, split_bytes, split_entries, "created split");
                splits.push(split);

                split_start = last_position;
                split_bytes = 0;
                split_entries = 0;
            }

            split_bytes = split_bytes.saturating_add(entry.byte_length);
            split_entries += 1;
            last_position = listing.position();
        }

        if last_position > split_start {
            let split = Split {
                start_offset: split_start,
                length: last_position - split_start,
            };
            debug!(?split, split_bytes, split_entries, "created split");
            splits.push(split);
        }

        gauge!(REPLICA_SPLITS_PLANNED).set(splits.len() as f64);
        info!(
            requested = self.num_splits,
            planned = splits.len(),
            "planned copy splits"
        );

        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::listing::entry::ListingEntry;
    use crate::listing::format::{LISTING_HEADER_BYTES, ListingWriter};

    struct Fixture {
        bytes: Vec<u8>,
        entries: Vec<ListingEntry>,
        total_bytes: u64,
    }

    fn fixture(sizes: &[u64]) -> Fixture {
        let mut bytes = Vec::new();
        let mut writer = ListingWriter::new(&mut bytes).unwrap();
        let entries = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| writer.append(&format!("part-{i:05}"), *size).unwrap())
            .collect();
        let summary = writer.finish().unwrap();

        Fixture {
            bytes,
            entries,
            total_bytes: summary.total_bytes,
        }
    }

    fn plan(fixture: &Fixture, num_splits: u32) -> ReplicaResult<Vec<Split>> {
        let reader = ListingReader::new(Cursor::new(fixture.bytes.clone())).unwrap();
        ListingSplitter::new(num_splits).plan(reader, fixture.total_bytes)
    }

    /// Sizes of the objects in each split, in order.
    fn split_sizes(fixture: &Fixture, splits: &[Split]) -> Vec<Vec<u64>> {
        splits
            .iter()
            .map(|split| {
                fixture
                    .entries
                    .iter()
                    .filter(|e| {
                        e.sequence_position >= split.start_offset
                            && e.sequence_position < split.end_offset().unwrap()
                    })
                    .map(|e| e.byte_length)
                    .collect()
            })
            .collect()
    }

    fn assert_covers_listing(fixture: &Fixture, splits: &[Split]) {
        let mut expected_start = LISTING_HEADER_BYTES;
        for split in splits {
            assert_eq!(split.start_offset, expected_start);
            assert!(split.length > 0);
            expected_start = split.end_offset().unwrap();
        }
        assert_eq!(expected_start, fixture.bytes.len() as u64);
    }

    #[test]
    fn zero_splits_yield_empty_plan() {
        let fixture = fixture(&[10, 20, 30]);
        assert!(plan(&fixture, 0).unwrap().is_empty());
    }

    #[test]
    fn zero_splits_do_not_touch_the_listing() {
        let splitter = ListingSplitter::new(0);
        let splits = splitter
            .plan_file(Path::new("/definitely/not/here"), 10)
            .unwrap();
        assert!(splits.is_empty());
    }

    #[test]
    fn huge_split_count_does_not_preallocate() {
        let fixture = fixture(&[10, 10]);
        let splits = plan(&fixture, u32::MAX).unwrap();

        assert_eq!(split_sizes(&fixture, &splits), vec![vec![10], vec![10]]);
        assert_covers_listing(&fixture, &splits);
    }

    #[test]
    fn uniform_objects_are_balanced() {
        let fixture = fixture(&[10; 8]);
        let splits = plan(&fixture, 4).unwrap();

        assert_eq!(
            split_sizes(&fixture, &splits),
            vec![vec![10, 10], vec![10, 10], vec![10, 10], vec![10, 10]]
        );
        assert_covers_listing(&fixture, &splits);
    }

    #[test]
    fn oversized_object_sits_alone() {
        let fixture = fixture(&[5, 100, 5, 5]);
        let splits = plan(&fixture, 3).unwrap();

        // target = ceil(115 / 3) = 39
        assert_eq!(
            split_sizes(&fixture, &splits),
            vec![vec![5], vec![100], vec![5, 5]]
        );
        assert_covers_listing(&fixture, &splits);
    }

    #[test]
    fn first_object_larger_than_target_is_not_cut_before() {
        let fixture = fixture(&[100, 1, 1]);
        let splits = plan(&fixture, 2).unwrap();

        // target = 51, the leading object opens the first split by itself
        assert_eq!(split_sizes(&fixture, &splits), vec![vec![100], vec![1, 1]]);
        assert_covers_listing(&fixture, &splits);
    }

    #[test]
    fn size_forcing_may_exceed_requested_splits() {
        let fixture = fixture(&[6, 6, 6, 6, 6]);
        let splits = plan(&fixture, 3).unwrap();

        // target = 10, no two objects fit together
        assert_eq!(splits.len(), 5);
        assert_covers_listing(&fixture, &splits);
    }

    #[test]
    fn fewer_splits_than_requested_when_objects_are_few() {
        let fixture = fixture(&[50, 50]);
        let splits = plan(&fixture, 10).unwrap();

        assert_eq!(split_sizes(&fixture, &splits), vec![vec![50], vec![50]]);
    }

    #[test]
    fn listing_order_is_preserved() {
        let fixture = fixture(&[1, 1, 30, 1, 1]);
        let splits = plan(&fixture, 2).unwrap();

        // target = 17, boundaries follow storage order without re-sorting
        assert_eq!(
            split_sizes(&fixture, &splits),
            vec![vec![1, 1], vec![30], vec![1, 1]]
        );
    }

    #[test]
    fn planning_is_deterministic() {
        let fixture = fixture(&[7, 3, 12, 9, 1, 40, 2, 2, 8]);
        assert_eq!(plan(&fixture, 4).unwrap(), plan(&fixture, 4).unwrap());
    }

    #[test]
    fn zero_total_bytes_is_an_invalid_plan() {
        let fixture = fixture(&[0, 0]);
        let err = plan(&fixture, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPlan);
    }

    #[test]
    fn zero_length_objects_join_the_current_split() {
        let fixture = fixture(&[10, 0, 0, 10]);
        let splits = plan(&fixture, 2).unwrap();

        assert_eq!(split_sizes(&fixture, &splits), vec![vec![10, 0, 0], vec![10]]);
    }

    #[test]
    fn empty_listing_yields_no_splits() {
        let fixture = fixture(&[]);
        let reader = ListingReader::new(Cursor::new(fixture.bytes.clone())).unwrap();
        let splits = ListingSplitter::new(3).plan(reader, 10).unwrap();
        assert!(splits.is_empty());
    }

    #[test]
    fn missing_listing_file_is_a_config_error() {
        let err = ListingSplitter::new(2)
            .plan_file(Path::new("/definitely/not/here"), 10)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigError);
    }
}
