/// Errors from archive store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The requested version does not exist.
    #[error("object {object} has no version {version}")]
    UnknownVersion { object: String, version: String },

    /// Another session is open for the object.
    #[error("object {0} already has an open session")]
    Busy(String),

    /// A logical path that cannot be stored.
    #[error("invalid logical path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// An existing inventory or storage root is damaged.
    #[error("corrupt storage at {location}: {reason}")]
    Corrupt { location: String, reason: String },

    /// The storage root uses a layout or algorithm this store cannot handle.
    #[error("unsupported storage configuration: {0}")]
    Unsupported(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
