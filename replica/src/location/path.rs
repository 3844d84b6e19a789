use std::fmt;

use serde::{Deserialize, Serialize};

/// A storage location such as `s3://bucket/table` or `/warehouse/table`.
///
/// Locations are kept as plain strings so that any filesystem scheme can be
/// represented; joining always inserts exactly one `/` between segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends `child` below this location.
    pub fn join(&self, child: impl AsRef<str>) -> Location {
        let child = child.as_ref().trim_start_matches('/');
        if child.is_empty() {
            return self.clone();
        }

        let parent = self.0.trim_end_matches('/');
        Location(format!("{parent}/{child}"))
    }

    /// Returns the part of this location below `root`, if it is below `root`.
    pub fn strip_prefix(&self, root: &Location) -> Option<&str> {
        let root = root.0.trim_end_matches('/');
        let rest = self.0.strip_prefix(root)?;

        match rest.strip_prefix('/') {
            Some(rest) => Some(rest.trim_end_matches('/')),
            None if rest.is_empty() => Some(rest),
            None => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Location::new(value)
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Location(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_inserts_single_separator() {
        let base = Location::new("s3://bucket/table/");
        assert_eq!(base.join("/event"), Location::new("s3://bucket/table/event"));
        assert_eq!(
            Location::new("tablePath").join("eventId"),
            Location::new("tablePath/eventId")
        );
    }

    #[test]
    fn join_with_empty_child_is_identity() {
        let base = Location::new("s3://bucket/table");
        assert_eq!(base.join(""), base);
    }

    #[test]
    fn strip_prefix_returns_sub_path() {
        let partition = Location::new("s3://bucket/table/local_date=2014-01-01/local_hour=0");
        let root = Location::new("s3://bucket/table/");

        assert_eq!(
            partition.strip_prefix(&root),
            Some("local_date=2014-01-01/local_hour=0")
        );
    }

    #[test]
    fn strip_prefix_requires_segment_boundary() {
        let location = Location::new("s3://bucket/table_v2/a=1");
        let root = Location::new("s3://bucket/table");

        assert_eq!(location.strip_prefix(&root), None);
    }
}
