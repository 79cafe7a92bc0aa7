use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown control group: {0}")]
    UnknownControlGroup(String),

    #[error("unknown datastream state: {0}")]
    UnknownState(String),

    #[error("invalid legacy timestamp: {0}")]
    InvalidTimestamp(String),
}
