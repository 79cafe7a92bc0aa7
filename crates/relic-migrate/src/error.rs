use relic_archive::ArchiveError;
use relic_content::ContentError;
use relic_foxml::FoxmlError;
use relic_ocfl::StoreError;

use crate::config::ConfigError;

/// Why one object could not be migrated.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("decode failed: {0}")]
    Decode(#[from] FoxmlError),

    #[error("write failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors ending or failing a migration run.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A single object failed; `pid` is the source name when the document
    /// failed before its pid was read.
    #[error("failed to migrate {pid}: {source}")]
    ObjectFailed {
        pid: String,
        #[source]
        source: ObjectError,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MigrationResult<T> = Result<T, MigrationError>;
