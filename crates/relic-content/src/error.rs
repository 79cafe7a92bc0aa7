/// Errors from content access.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The backing resource does not exist (or no longer exists).
    #[error("content unavailable at {location}: {reason}")]
    Unavailable { location: String, reason: String },

    /// A legacy internal id matched zero or several stored resources.
    #[error("internal id {id} is unresolvable: {matches} matching resources")]
    Unresolvable { id: String, matches: usize },

    /// The remote side could not be reached or answered with an error.
    #[error("transport error fetching {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The URL could not be parsed or uses an unsupported scheme.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// I/O error while reading local content.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContentError {
    /// `true` when the content is missing, as opposed to a transport or
    /// local I/O failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Unresolvable { .. })
    }
}

/// Result alias for content operations.
pub type ContentResult<T> = Result<T, ContentError>;
