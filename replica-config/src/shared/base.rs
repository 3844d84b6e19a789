use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A lifecycle event has neither its own topic nor the default `topic`.
    #[error("no topic configured for `{0}` events, set `{0}_topic` or `topic`")]
    MissingTopic(&'static str),
    /// Maximum message size cannot be zero.
    #[error("`max_message_size_bytes` cannot be zero")]
    MaxMessageSizeZero,
    /// The copier needs a listing to plan from.
    #[error("`listing_path` cannot be empty")]
    EmptyListingPath,
    /// Catalog names identify the catalogs in every notification.
    #[error("`{0}.name` cannot be empty")]
    EmptyCatalogName(&'static str),
}
