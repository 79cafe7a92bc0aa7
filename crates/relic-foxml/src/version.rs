use std::fmt;
use std::sync::Arc;

use relic_content::ContentAccessor;
use relic_types::{ContentDigest, DatastreamInfo};

/// One historical version of a datastream, as read from the serialization.
///
/// The content is not read here; [`content`](Self::content) opens it lazily.
pub struct DatastreamVersion {
    datastream: Arc<DatastreamInfo>,
    id: String,
    label: String,
    created: String,
    mime_type: String,
    format_uri: Option<String>,
    alt_ids: Vec<String>,
    size: Option<u64>,
    digest: Option<ContentDigest>,
    external_url: Option<String>,
    content: Box<dyn ContentAccessor>,
}

impl DatastreamVersion {
    pub fn new(
        datastream: Arc<DatastreamInfo>,
        id: impl Into<String>,
        created: impl Into<String>,
        content: Box<dyn ContentAccessor>,
    ) -> Self {
        Self {
            datastream,
            id: id.into(),
            label: String::new(),
            created: created.into(),
            mime_type: String::new(),
            format_uri: None,
            alt_ids: Vec::new(),
            size: None,
            digest: None,
            external_url: None,
            content,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_format_uri(mut self, format_uri: impl Into<String>) -> Self {
        self.format_uri = Some(format_uri.into());
        self
    }

    pub fn with_alt_ids(mut self, alt_ids: Vec<String>) -> Self {
        self.alt_ids = alt_ids;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_digest(mut self, digest: ContentDigest) -> Self {
        self.digest = Some(digest);
        self
    }

    /// Record the (already substituted) URL of externally held content.
    pub fn with_external_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }

    pub fn datastream(&self) -> &DatastreamInfo {
        &self.datastream
    }

    /// Shared handle to the owning datastream.
    pub fn datastream_arc(&self) -> &Arc<DatastreamInfo> {
        &self.datastream
    }

    /// Version id, e.g. `DS1.0`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Creation timestamp exactly as written in the serialization.
    pub fn created(&self) -> &str {
        &self.created
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn format_uri(&self) -> Option<&str> {
        self.format_uri.as_deref()
    }

    pub fn alt_ids(&self) -> &[String] {
        &self.alt_ids
    }

    /// Declared size, when the serialization carried a usable one.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn digest(&self) -> Option<&ContentDigest> {
        self.digest.as_ref()
    }

    pub fn external_url(&self) -> Option<&str> {
        self.external_url.as_deref()
    }

    pub fn content(&self) -> &dyn ContentAccessor {
        self.content.as_ref()
    }
}

impl fmt::Debug for DatastreamVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatastreamVersion")
            .field("datastream", &self.datastream.id())
            .field("id", &self.id)
            .field("created", &self.created)
            .field("mime_type", &self.mime_type)
            .field("content", &self.content.describe())
            .finish()
    }
}
