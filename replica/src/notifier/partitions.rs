use indexmap::IndexMap;

use crate::location::Location;

/// A partition touched by a replication run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPartition {
    /// Partition key values, in partition key order.
    pub values: Vec<String>,
    pub location: Option<Location>,
}

impl EventPartition {
    pub fn new(values: Vec<String>, location: Location) -> Self {
        Self {
            values,
            location: Some(location),
        }
    }
}

/// Partitions of one table together with the table's partition key types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPartitions {
    key_types: IndexMap<String, String>,
    partitions: Vec<EventPartition>,
}

impl EventPartitions {
    /// Creates an empty collection for a table partitioned by `key_types`
    /// (partition key name to type, in partition key order).
    pub fn new(key_types: IndexMap<String, String>) -> Self {
        Self {
            key_types,
            partitions: Vec::new(),
        }
    }

    pub fn add(&mut self, partition: EventPartition) {
        self.partitions.push(partition);
    }

    pub fn key_types(&self) -> &IndexMap<String, String> {
        &self.key_types
    }

    pub fn partitions(&self) -> &[EventPartition] {
        &self.partitions
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    fn merge(&mut self, other: EventPartitions) {
        if self.key_types.is_empty() {
            self.key_types = other.key_types;
        }
        self.partitions.extend(other.partitions);
    }
}

/// Partitions created and altered during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionDiff {
    created: Option<EventPartitions>,
    altered: Option<EventPartitions>,
}

impl PartitionDiff {
    pub fn record_created(&mut self, partitions: EventPartitions) {
        merge_into(&mut self.created, partitions);
    }

    pub fn record_altered(&mut self, partitions: EventPartitions) {
        merge_into(&mut self.altered, partitions);
    }

    pub fn created(&self) -> Option<&EventPartitions> {
        self.created.as_ref()
    }

    pub fn altered(&self) -> Option<&EventPartitions> {
        self.altered.as_ref()
    }

    /// Returns `true` when nothing was ever recorded.
    pub fn is_empty(&self) -> bool {
        self.created.is_none() && self.altered.is_none()
    }

    /// Partition key types of the replicated table, if any partition was recorded.
    pub fn partition_keys(&self) -> Option<&IndexMap<String, String>> {
        self.created
            .as_ref()
            .or(self.altered.as_ref())
            .map(EventPartitions::key_types)
    }

    /// Key values of every modified partition, created partitions first.
    ///
    /// Returns `None` when neither created nor altered partitions were recorded.
    pub fn modified_partitions(&self) -> Option<Vec<Vec<String>>> {
        if self.is_empty() {
            return None;
        }

        let created = self.created.iter().flat_map(|p| p.partitions());
        let altered = self.altered.iter().flat_map(|p| p.partitions());

        Some(
            created
                .chain(altered)
                .map(|partition| partition.values.clone())
                .collect(),
        )
    }
}

fn merge_into(slot: &mut Option<EventPartitions>, partitions: EventPartitions) {
    match slot {
        Some(existing) => existing.merge(partitions),
        None => *slot = Some(partitions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partitions(values: &[&str]) -> EventPartitions {
        let mut key_types = IndexMap::new();
        key_types.insert("key".to_string(), "string".to_string());

        let mut partitions = EventPartitions::new(key_types);
        for value in values {
            partitions.add(EventPartition::new(
                vec![value.to_string()],
                Location::new(format!("location_{value}")),
            ));
        }
        partitions
    }

    #[test]
    fn created_partitions_come_before_altered() {
        let mut diff = PartitionDiff::default();
        diff.record_altered(partitions(&["b"]));
        diff.record_created(partitions(&["a"]));

        assert_eq!(
            diff.modified_partitions(),
            Some(vec![vec!["a".to_string()], vec!["b".to_string()]])
        );
    }

    #[test]
    fn only_created_partitions() {
        let mut diff = PartitionDiff::default();
        diff.record_created(partitions(&["a", "b"]));

        assert_eq!(
            diff.modified_partitions(),
            Some(vec![vec!["a".to_string()], vec!["b".to_string()]])
        );
    }

    #[test]
    fn nothing_recorded_has_no_modified_partitions() {
        let diff = PartitionDiff::default();

        assert_eq!(diff.modified_partitions(), None);
        assert_eq!(diff.partition_keys(), None);
    }

    #[test]
    fn recorded_but_empty_collections_yield_empty_list() {
        let mut diff = PartitionDiff::default();
        diff.record_created(partitions(&[]));

        assert_eq!(diff.modified_partitions(), Some(vec![]));
        assert!(diff.partition_keys().is_some());
    }

    #[test]
    fn repeated_records_accumulate() {
        let mut diff = PartitionDiff::default();
        diff.record_created(partitions(&["a"]));
        diff.record_created(partitions(&["b"]));
        diff.record_altered(partitions(&["c"]));

        assert_eq!(
            diff.modified_partitions(),
            Some(vec![
                vec!["a".to_string()],
                vec!["b".to_string()],
                vec!["c".to_string()],
            ])
        );
    }

    #[test]
    fn partition_keys_keep_declaration_order() {
        let mut key_types = IndexMap::new();
        key_types.insert("local_date".to_string(), "string".to_string());
        key_types.insert("local_hour".to_string(), "int".to_string());

        let mut diff = PartitionDiff::default();
        diff.record_altered(EventPartitions::new(key_types));

        let keys: Vec<_> = diff.partition_keys().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["local_date", "local_hour"]);
    }
}
