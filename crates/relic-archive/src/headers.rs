//! Resource headers.
//!
//! Every resource in an archive group gets a JSON header next to its content
//! describing what kind of resource it is, where it sits in the containment
//! tree, and how its bytes are stored.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ArchiveResult;

/// Version of the header document format.
pub const HEADERS_VERSION: &str = "1.0";

/// Parent of every object root.
pub const REPOSITORY_ROOT: &str = "info:fedora";

/// Destination-side resource kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionModel {
    #[serde(rename = "http://www.w3.org/ns/ldp#BasicContainer")]
    BasicContainer,
    #[serde(rename = "http://www.w3.org/ns/ldp#NonRDFSource")]
    NonRdfSource,
    #[serde(rename = "http://fedora.info/definitions/v4/repository#NonRdfSourceDescription")]
    NonRdfSourceDescription,
}

impl InteractionModel {
    pub fn uri(&self) -> &'static str {
        match self {
            Self::BasicContainer => "http://www.w3.org/ns/ldp#BasicContainer",
            Self::NonRdfSource => "http://www.w3.org/ns/ldp#NonRDFSource",
            Self::NonRdfSourceDescription => {
                "http://fedora.info/definitions/v4/repository#NonRdfSourceDescription"
            }
        }
    }
}

/// How a binary whose bytes were not imported is served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalHandling {
    Proxy,
    Redirect,
}

/// JSON header stored for every resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHeaders {
    pub headers_version: String,
    pub id: String,
    pub parent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archival_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_token: Option<String>,
    pub interaction_model: InteractionModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub digests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_handling: Option<ExternalHandling>,
    pub created_date: String,
    pub created_by: String,
    pub last_modified_date: String,
    pub last_modified_by: String,
    pub archival_group: bool,
    pub object_root: bool,
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_path: Option<String>,
}

impl ResourceHeaders {
    /// Header skeleton with timestamps and actor filled in.
    pub fn new(
        id: impl Into<String>,
        parent: impl Into<String>,
        interaction_model: InteractionModel,
        actor: &str,
        timestamp: &DateTime<Utc>,
    ) -> Self {
        let when = format_timestamp(timestamp);
        Self {
            headers_version: HEADERS_VERSION.to_string(),
            id: id.into(),
            parent: parent.into(),
            archival_group_id: None,
            state_token: None,
            interaction_model,
            mime_type: None,
            filename: None,
            content_size: None,
            digests: Vec::new(),
            external_url: None,
            external_handling: None,
            created_date: when.clone(),
            created_by: actor.to_string(),
            last_modified_date: when,
            last_modified_by: actor.to_string(),
            archival_group: false,
            object_root: false,
            deleted: false,
            content_path: None,
        }
    }

    /// Header for the root container of an archive group.
    pub fn object_root(
        id: impl Into<String>,
        actor: &str,
        timestamp: &DateTime<Utc>,
    ) -> Self {
        let mut headers = Self::new(
            id,
            REPOSITORY_ROOT,
            InteractionModel::BasicContainer,
            actor,
            timestamp,
        );
        headers.archival_group = true;
        headers.object_root = true;
        headers
    }

    /// Whether the bytes live outside the archive group.
    pub fn is_external(&self) -> bool {
        self.external_handling.is_some()
    }

    pub fn to_json(&self) -> ArchiveResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> ArchiveResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Timestamp format used in headers.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn object_root_defaults() {
        let headers = ResourceHeaders::object_root("info:fedora/demo:1", "fedoraAdmin", &at());
        assert_eq!(headers.parent, "info:fedora");
        assert_eq!(headers.interaction_model, InteractionModel::BasicContainer);
        assert!(headers.archival_group);
        assert!(headers.object_root);
        assert!(!headers.deleted);
        assert_eq!(headers.created_date, "2024-03-01T12:00:00.000Z");
        assert_eq!(headers.created_by, "fedoraAdmin");
    }

    #[test]
    fn json_uses_camel_case_and_omits_unset_fields() {
        let mut headers = ResourceHeaders::new(
            "info:fedora/demo:1/DS1",
            "info:fedora/demo:1",
            InteractionModel::NonRdfSource,
            "fedoraAdmin",
            &at(),
        );
        headers.content_size = Some(5);
        headers.external_handling = Some(ExternalHandling::Proxy);

        let json: serde_json::Value =
            serde_json::from_slice(&headers.to_json().unwrap()).unwrap();
        assert_eq!(json["headersVersion"], "1.0");
        assert_eq!(json["interactionModel"], "http://www.w3.org/ns/ldp#NonRDFSource");
        assert_eq!(json["contentSize"], 5);
        assert_eq!(json["externalHandling"], "proxy");
        assert_eq!(json["archivalGroup"], false);
        assert!(json.get("mimeType").is_none());
        assert!(json.get("digests").is_none());
    }

    #[test]
    fn parses_written_headers() {
        let mut headers = ResourceHeaders::object_root("info:fedora/demo:1", "a", &at());
        headers.digests.push("urn:sha-512:abc".into());
        let parsed = ResourceHeaders::from_slice(&headers.to_json().unwrap()).unwrap();
        assert_eq!(parsed, headers);
    }

    #[test]
    fn interaction_model_uris_match_serialization() {
        for model in [
            InteractionModel::BasicContainer,
            InteractionModel::NonRdfSource,
            InteractionModel::NonRdfSourceDescription,
        ] {
            let json = serde_json::to_string(&model).unwrap();
            assert_eq!(json, format!("\"{}\"", model.uri()));
        }
    }
}
