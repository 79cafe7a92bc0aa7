use relic_content::ContentError;
use relic_types::TypeError;

/// Errors raised while decoding a FOXML serialization.
///
/// Any of these aborts the object being decoded; other objects in the same
/// run are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum FoxmlError {
    /// The XML itself is not well formed (including mismatched end tags).
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// An element that is not allowed where it appears.
    #[error("unexpected element <{element}> in {context} at byte {position}")]
    UnexpectedElement {
        element: String,
        context: &'static str,
        position: u64,
    },

    /// Non-whitespace character data where only elements are allowed.
    #[error("unexpected character data in {context} at byte {position}")]
    UnexpectedText { context: &'static str, position: u64 },

    #[error("missing attribute {attribute} on <{element}>")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("invalid value {value:?} for attribute {attribute} on <{element}>: {reason}")]
    InvalidAttribute {
        element: String,
        attribute: &'static str,
        value: String,
        reason: String,
    },

    /// Structurally invalid document (missing content, truncated input, ...).
    #[error("malformed object serialization: {0}")]
    Malformed(String),

    #[error("duplicate version {version} of datastream {datastream}")]
    DuplicateVersion { datastream: String, version: String },

    #[error("invalid base64 content: {0}")]
    Base64(String),

    /// A content location could not be resolved.
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FoxmlError {
    pub(crate) fn invalid_value(
        element: &str,
        attribute: &'static str,
        value: &str,
        err: TypeError,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.to_string(),
            attribute,
            value: value.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result alias for decoder operations.
pub type FoxmlResult<T> = Result<T, FoxmlError>;
