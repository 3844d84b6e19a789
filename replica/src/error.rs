use std::error;
use std::fmt;

/// Result type of every fallible replication operation.
pub type ReplicaResult<T> = Result<T, ReplicaError>;

/// Error type of the replication core.
///
/// An error carries an [`ErrorKind`] used for programmatic handling, a static
/// description and optionally a dynamic detail. Several errors can be
/// aggregated into one, for example when flushing many cleanup locations.
#[derive(Debug, Clone)]
pub struct ReplicaError {
    repr: ErrorRepr,
}

#[derive(Debug, Clone)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    Many(Vec<ReplicaError>),
}

/// Categories of replication errors.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Planning errors
    ConfigError,
    ListingCorrupted,
    InvalidPlan,

    // Contract violations
    UnsupportedOperation,

    // Location errors
    InvalidLocation,

    // Collaborator errors
    PublishFailed,
    CleanupFailed,
    CatalogListenerFailed,

    // IO & serialization errors
    IoError,
    SerializationError,

    // Data errors
    InvalidData,

    Unknown,
}

impl ReplicaError {
    /// Aggregates several errors into one.
    pub fn many(errors: Vec<ReplicaError>) -> ReplicaError {
        ReplicaError {
            repr: ErrorRepr::Many(errors),
        }
    }

    /// Returns the kind of this error, or of the first aggregated error.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
            ErrorRepr::Many(ref errors) => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns the kinds of all the errors, flattening aggregated ones.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => vec![kind],
            ErrorRepr::Many(ref errors) => errors.iter().flat_map(|err| err.kinds()).collect(),
        }
    }

    /// Returns the first available dynamic detail.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::Many(ref errors) => errors.iter().find_map(|e| e.detail()),
            ErrorRepr::WithDescription(_, _) => None,
        }
    }
}

impl PartialEq for ReplicaError {
    fn eq(&self, other: &ReplicaError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::WithDescription(kind_a, _), ErrorRepr::WithDescription(kind_b, _)) => {
                kind_a == kind_b
            }
            (
                ErrorRepr::WithDescriptionAndDetail(kind_a, _, _),
                ErrorRepr::WithDescriptionAndDetail(kind_b, _, _),
            ) => kind_a == kind_b,
            (ErrorRepr::Many(errors_a), ErrorRepr::Many(errors_b)) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ReplicaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => write!(f, "{kind:?}: {desc}"),
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                write!(f, "{kind:?}: {desc} -> {detail}")
            }
            ErrorRepr::Many(ref errors) => match errors.as_slice() {
                [] => f.write_str("Multiple errors occurred (empty)"),
                [error] => error.fmt(f),
                errors => {
                    write!(f, "Multiple errors occurred ({} total):", errors.len())?;
                    for (i, error) in errors.iter().enumerate() {
                        write!(f, "\n  {}: {}", i + 1, error)?;
                    }
                    Ok(())
                }
            },
        }
    }
}

impl error::Error for ReplicaError {}

impl From<(ErrorKind, &'static str)> for ReplicaError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> ReplicaError {
        ReplicaError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

impl From<(ErrorKind, &'static str, String)> for ReplicaError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> ReplicaError {
        ReplicaError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

impl From<std::io::Error> for ReplicaError {
    fn from(err: std::io::Error) -> ReplicaError {
        ReplicaError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::IoError,
                "I/O error occurred",
                err.to_string(),
            ),
        }
    }
}

impl From<serde_json::Error> for ReplicaError {
    fn from(err: serde_json::Error) -> ReplicaError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => {
                (ErrorKind::SerializationError, "JSON serialization failed")
            }
        };

        ReplicaError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}

impl From<replica_config::shared::ValidationError> for ReplicaError {
    fn from(err: replica_config::shared::ValidationError) -> ReplicaError {
        ReplicaError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::ConfigError,
                "Invalid configuration",
                err.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replica_error;

    #[test]
    fn single_error_display() {
        let err = replica_error!(ErrorKind::InvalidPlan, "No bytes to split");
        assert_eq!(err.to_string(), "InvalidPlan: No bytes to split");
        assert_eq!(err.kind(), ErrorKind::InvalidPlan);
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn error_with_detail_display() {
        let err = replica_error!(
            ErrorKind::ConfigError,
            "Listing not found",
            "/tmp/missing"
        );
        assert_eq!(
            err.to_string(),
            "ConfigError: Listing not found -> /tmp/missing"
        );
        assert_eq!(err.detail(), Some("/tmp/missing"));
    }

    #[test]
    fn many_errors_report_all_kinds() {
        let err = ReplicaError::many(vec![
            replica_error!(ErrorKind::CleanupFailed, "first"),
            replica_error!(ErrorKind::IoError, "second", "disk"),
        ]);

        assert_eq!(err.kind(), ErrorKind::CleanupFailed);
        assert_eq!(
            err.kinds(),
            vec![ErrorKind::CleanupFailed, ErrorKind::IoError]
        );
        assert_eq!(err.detail(), Some("disk"));
        assert!(err.to_string().starts_with("Multiple errors occurred (2 total):"));
    }

    #[test]
    fn single_aggregated_error_displays_directly() {
        let err = ReplicaError::many(vec![replica_error!(ErrorKind::PublishFailed, "down")]);
        assert_eq!(err.to_string(), "PublishFailed: down");
    }

    #[test]
    fn empty_aggregate_is_unknown() {
        let err = ReplicaError::many(vec![]);
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.kinds().is_empty());
    }

    #[test]
    fn io_error_conversion() {
        let err: ReplicaError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::IoError);
        assert_eq!(err.detail(), Some("gone"));
    }

    #[test]
    fn json_error_conversion() {
        let err: ReplicaError = serde_json::to_string(&std::collections::HashMap::from([(
            vec![1u8],
            "value",
        )]))
        .unwrap_err()
        .into();
        assert_eq!(err.kind(), ErrorKind::SerializationError);
    }

    #[test]
    fn equality_compares_kinds_only() {
        let a = replica_error!(ErrorKind::InvalidData, "a", "x");
        let b = replica_error!(ErrorKind::InvalidData, "b", "y");
        let c = replica_error!(ErrorKind::InvalidData, "a");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
