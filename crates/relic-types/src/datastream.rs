use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::object::ObjectInfo;

/// How a datastream's bytes are stored or referenced by the legacy repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlGroup {
    /// Bytes managed by the repository (`M`).
    Managed,
    /// Bytes hosted elsewhere and proxied (`E`).
    External,
    /// Bytes hosted elsewhere, clients are redirected (`R`).
    Redirect,
    /// XML stored inline in the object serialization (`X`).
    InlineXml,
}

impl ControlGroup {
    /// Parse the single-letter legacy code.
    pub fn from_code(code: &str) -> Result<Self, TypeError> {
        match code.trim() {
            "M" => Ok(Self::Managed),
            "E" => Ok(Self::External),
            "R" => Ok(Self::Redirect),
            "X" => Ok(Self::InlineXml),
            other => Err(TypeError::UnknownControlGroup(other.to_string())),
        }
    }

    /// The single-letter legacy code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Managed => "M",
            Self::External => "E",
            Self::Redirect => "R",
            Self::InlineXml => "X",
        }
    }

    /// `true` for groups whose bytes live outside the repository.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External | Self::Redirect)
    }
}

impl fmt::Display for ControlGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Lifecycle state of a legacy object or datastream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatastreamState {
    Active,
    Inactive,
    Deleted,
}

impl DatastreamState {
    /// Parse either the one-letter code (`A`) or the long form (`Active`).
    pub fn from_code(code: &str) -> Result<Self, TypeError> {
        match code.trim() {
            "A" | "Active" => Ok(Self::Active),
            "I" | "Inactive" => Ok(Self::Inactive),
            "D" | "Deleted" => Ok(Self::Deleted),
            other => Err(TypeError::UnknownState(other.to_string())),
        }
    }

    /// Long-form label used in generated descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Deleted => "Deleted",
        }
    }
}

impl Default for DatastreamState {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for DatastreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Datastream-level metadata shared by all versions of one datastream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatastreamInfo {
    object: Arc<ObjectInfo>,
    id: String,
    control_group: ControlGroup,
    uri: Option<String>,
    state: DatastreamState,
    versionable: bool,
}

impl DatastreamInfo {
    pub fn new(
        object: Arc<ObjectInfo>,
        id: impl Into<String>,
        control_group: ControlGroup,
        state: DatastreamState,
        versionable: bool,
    ) -> Self {
        Self {
            object,
            id: id.into(),
            control_group,
            uri: None,
            state,
            versionable,
        }
    }

    /// Attach the datastream's URI from the serialization.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// The object this datastream belongs to.
    pub fn object(&self) -> &ObjectInfo {
        &self.object
    }

    /// Datastream id, unique within the owning object.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn control_group(&self) -> ControlGroup {
        self.control_group
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn state(&self) -> DatastreamState {
        self.state
    }

    pub fn versionable(&self) -> bool {
        self.versionable
    }
}

/// A content digest declared by the legacy serialization.
///
/// The algorithm name is kept as written (`MD5`, `SHA-1`, ...); mapping it to
/// a supported algorithm is the digest crate's job.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    pub algorithm: String,
    pub digest: String,
}

impl ContentDigest {
    pub fn new(algorithm: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            digest: digest.into(),
        }
    }

    /// Legacy repositories write `TYPE="DISABLED"` or `DIGEST="none"` when
    /// checksumming was switched off; such digests carry no information.
    pub fn is_disabled(&self) -> bool {
        self.algorithm.eq_ignore_ascii_case("disabled")
            || self.digest.is_empty()
            || self.digest.eq_ignore_ascii_case("none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_group_codes() {
        for group in [
            ControlGroup::Managed,
            ControlGroup::External,
            ControlGroup::Redirect,
            ControlGroup::InlineXml,
        ] {
            assert_eq!(ControlGroup::from_code(group.code()).unwrap(), group);
        }
        assert!(matches!(
            ControlGroup::from_code("Q"),
            Err(TypeError::UnknownControlGroup(_))
        ));
    }

    #[test]
    fn only_external_and_redirect_are_external() {
        assert!(ControlGroup::External.is_external());
        assert!(ControlGroup::Redirect.is_external());
        assert!(!ControlGroup::Managed.is_external());
        assert!(!ControlGroup::InlineXml.is_external());
    }

    #[test]
    fn state_accepts_short_and_long_forms() {
        assert_eq!(DatastreamState::from_code("A").unwrap(), DatastreamState::Active);
        assert_eq!(
            DatastreamState::from_code("Inactive").unwrap(),
            DatastreamState::Inactive
        );
        assert_eq!(DatastreamState::from_code(" D ").unwrap(), DatastreamState::Deleted);
        assert!(DatastreamState::from_code("X").is_err());
    }

    #[test]
    fn datastream_info_accessors() {
        let object = Arc::new(ObjectInfo::new("demo:1", None));
        let ds = DatastreamInfo::new(
            object,
            "DS1",
            ControlGroup::Managed,
            DatastreamState::Inactive,
            false,
        )
        .with_uri("info:fedora/demo:1/DS1");
        assert_eq!(ds.object().pid(), "demo:1");
        assert_eq!(ds.id(), "DS1");
        assert_eq!(ds.control_group(), ControlGroup::Managed);
        assert_eq!(ds.state(), DatastreamState::Inactive);
        assert!(!ds.versionable());
        assert_eq!(ds.uri(), Some("info:fedora/demo:1/DS1"));
    }

    #[test]
    fn disabled_digests() {
        assert!(ContentDigest::new("DISABLED", "none").is_disabled());
        assert!(ContentDigest::new("MD5", "none").is_disabled());
        assert!(ContentDigest::new("MD5", "").is_disabled());
        assert!(!ContentDigest::new("MD5", "d41d8cd98f00b204e9800998ecf8427e").is_disabled());
    }
}
