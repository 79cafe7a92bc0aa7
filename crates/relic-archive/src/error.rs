use relic_content::ContentError;
use relic_ocfl::StoreError;
use relic_types::TypeError;

/// Errors from writing an object to the archive.
///
/// Every variant aborts the object being written; nothing staged for it is
/// published.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Declared and computed checksums disagree.
    #[error(
        "digest mismatch for datastream {datastream}: expected {algorithm} {expected}, computed {actual}"
    )]
    DigestMismatch {
        datastream: String,
        algorithm: String,
        expected: String,
        actual: String,
    },

    /// An External or Redirect datastream version without a URL.
    #[error("datastream {datastream} version {version} has no external URL")]
    MissingExternalUrl { datastream: String, version: String },

    /// A legacy timestamp that cannot be parsed.
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] TypeError),

    /// Content could not be read.
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// The destination store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ArchiveError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;
