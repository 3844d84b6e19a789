use crate::bail;
use crate::error::{ErrorKind, ReplicaResult};
use crate::location::base::SourceLocationResolver;
use crate::location::path::Location;

/// Resolves partition sub paths against the source table location.
///
/// Partitions stored outside the table location cannot be mirrored on the
/// replica and are rejected.
#[derive(Debug, Clone)]
pub struct TableRootResolver {
    table_location: Location,
}

impl TableRootResolver {
    pub fn new(table_location: Location) -> Self {
        Self { table_location }
    }

    pub fn table_location(&self) -> &Location {
        &self.table_location
    }
}

impl SourceLocationResolver for TableRootResolver {
    fn sub_path_of(&self, location: &Location) -> ReplicaResult<String> {
        match location.strip_prefix(&self.table_location) {
            Some(sub_path) => Ok(sub_path.to_owned()),
            None => bail!(
                ErrorKind::InvalidLocation,
                "Partition location is not below the source table location",
                format!("{location} is not below {}", self.table_location)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_partition_below_table() {
        let resolver = TableRootResolver::new(Location::new("hdfs://nn/warehouse/db/table"));
        let sub_path = resolver
            .sub_path_of(&Location::new(
                "hdfs://nn/warehouse/db/table/local_date=2014-01-01",
            ))
            .unwrap();

        assert_eq!(sub_path, "local_date=2014-01-01");
    }

    #[test]
    fn rejects_partition_outside_table() {
        let resolver = TableRootResolver::new(Location::new("hdfs://nn/warehouse/db/table"));
        let err = resolver
            .sub_path_of(&Location::new("hdfs://nn/elsewhere/local_date=2014-01-01"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidLocation);
    }
}
