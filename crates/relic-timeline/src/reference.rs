use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use relic_foxml::{DatastreamVersion, FoxmlError, FoxmlResult, ObjectHandler};
use relic_types::{ObjectInfo, ObjectProperties};
use tracing::debug;

use crate::timeline::{reconstruct, ObjectVersionReference};

/// Random-access view of one decoded object.
///
/// Datastreams keep the order in which they first appeared in the document;
/// versions keep document order within their datastream.
pub struct ObjectReference {
    object: Arc<ObjectInfo>,
    properties: ObjectProperties,
    datastream_ids: Vec<String>,
    versions: HashMap<String, Vec<DatastreamVersion>>,
}

impl ObjectReference {
    pub fn new(object: Arc<ObjectInfo>, properties: ObjectProperties) -> Self {
        Self {
            object,
            properties,
            datastream_ids: Vec::new(),
            versions: HashMap::new(),
        }
    }

    /// Add a version, rejecting a second version with the same
    /// (datastream id, version id).
    pub fn add_version(&mut self, version: DatastreamVersion) -> FoxmlResult<()> {
        let datastream_id = version.datastream().id().to_string();
        if !self.versions.contains_key(&datastream_id) {
            self.datastream_ids.push(datastream_id.clone());
        }
        let versions = self.versions.entry(datastream_id.clone()).or_default();
        if versions.iter().any(|v| v.id() == version.id()) {
            return Err(FoxmlError::DuplicateVersion {
                datastream: datastream_id,
                version: version.id().to_string(),
            });
        }
        versions.push(version);
        Ok(())
    }

    pub fn object(&self) -> &ObjectInfo {
        &self.object
    }

    pub fn object_arc(&self) -> &Arc<ObjectInfo> {
        &self.object
    }

    pub fn pid(&self) -> &str {
        self.object.pid()
    }

    pub fn properties(&self) -> &ObjectProperties {
        &self.properties
    }

    /// Datastream ids in document order.
    pub fn datastream_ids(&self) -> impl Iterator<Item = &str> {
        self.datastream_ids.iter().map(String::as_str)
    }

    /// Versions of one datastream in document order; empty if unknown.
    pub fn versions(&self, datastream_id: &str) -> &[DatastreamVersion] {
        self.versions
            .get(datastream_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every version of every datastream, datastreams in document order.
    pub fn all_versions(&self) -> impl Iterator<Item = &DatastreamVersion> {
        self.datastream_ids
            .iter()
            .flat_map(move |id| self.versions(id).iter())
    }

    pub fn version_count(&self) -> usize {
        self.versions.values().map(Vec::len).sum()
    }

    pub fn datastream_count(&self) -> usize {
        self.datastream_ids.len()
    }

    /// The object's chronological timeline.
    pub fn timeline(&self) -> Vec<ObjectVersionReference<'_>> {
        reconstruct(self)
    }
}

impl fmt::Debug for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectReference")
            .field("pid", &self.object.pid())
            .field("properties", &self.properties.len())
            .field("datastreams", &self.datastream_ids.len())
            .field("versions", &self.version_count())
            .finish()
    }
}

/// [`ObjectHandler`] that accumulates decoder callbacks into an
/// [`ObjectReference`].
///
/// The reference becomes available through [`take`](Self::take) once
/// `complete` was received. Handlers that must read temporary content
/// embed a builder and consume the reference inside their own `complete`.
#[derive(Debug, Default)]
pub struct ObjectReferenceBuilder {
    pending: Option<ObjectReference>,
    object: Option<Arc<ObjectInfo>>,
    completed: bool,
}

impl ObjectReferenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last decoded object completed successfully.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Take the completed reference, leaving the builder ready for the next
    /// object. `None` if decoding did not complete.
    pub fn take(&mut self) -> Option<ObjectReference> {
        if !self.completed {
            return None;
        }
        self.completed = false;
        self.object = None;
        self.pending.take()
    }

    fn pending_mut(&mut self) -> FoxmlResult<&mut ObjectReference> {
        self.pending.as_mut().ok_or_else(|| {
            FoxmlError::Malformed("datastream version reported before object properties".into())
        })
    }
}

impl ObjectHandler for ObjectReferenceBuilder {
    type Error = FoxmlError;

    fn begin(&mut self, object: &ObjectInfo) -> FoxmlResult<()> {
        self.pending = None;
        self.completed = false;
        self.object = Some(Arc::new(object.clone()));
        Ok(())
    }

    fn properties(&mut self, object: &ObjectInfo, properties: ObjectProperties) -> FoxmlResult<()> {
        let object = match &self.object {
            Some(current) if current.pid() == object.pid() => Arc::clone(current),
            _ => Arc::new(object.clone()),
        };
        self.pending = Some(ObjectReference::new(object, properties));
        Ok(())
    }

    fn datastream_version(&mut self, version: DatastreamVersion) -> FoxmlResult<()> {
        self.pending_mut()?.add_version(version)
    }

    fn complete(&mut self, object: &ObjectInfo) -> FoxmlResult<()> {
        let reference = self.pending_mut()?;
        debug!(
            pid = object.pid(),
            datastreams = reference.datastream_count(),
            versions = reference.version_count(),
            "object accumulated"
        );
        self.completed = true;
        Ok(())
    }

    fn abort(&mut self, object: &ObjectInfo) {
        debug!(pid = object.pid(), "discarding partially accumulated object");
        self.pending = None;
        self.object = None;
        self.completed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_content::{MemoryContent, NullIdResolver};
    use relic_foxml::{DecoderConfig, DecoderContext};
    use relic_types::{ControlGroup, DatastreamInfo, DatastreamState};

    fn version(object: &Arc<ObjectInfo>, dsid: &str, vid: &str, created: &str) -> DatastreamVersion {
        let info = Arc::new(DatastreamInfo::new(
            Arc::clone(object),
            dsid,
            ControlGroup::InlineXml,
            DatastreamState::Active,
            true,
        ));
        DatastreamVersion::new(info, vid, created, Box::new(MemoryContent::new(Vec::new())))
    }

    #[test]
    fn keeps_document_order() {
        let object = Arc::new(ObjectInfo::new("demo:1", None));
        let mut reference = ObjectReference::new(Arc::clone(&object), ObjectProperties::new());
        reference.add_version(version(&object, "DS2", "DS2.0", "2010")).unwrap();
        reference.add_version(version(&object, "DS1", "DS1.0", "2011")).unwrap();
        reference.add_version(version(&object, "DS2", "DS2.1", "2012")).unwrap();

        assert_eq!(reference.datastream_ids().collect::<Vec<_>>(), vec!["DS2", "DS1"]);
        assert_eq!(reference.version_count(), 3);
        let ids: Vec<&str> = reference.all_versions().map(|v| v.id()).collect();
        assert_eq!(ids, vec!["DS2.0", "DS2.1", "DS1.0"]);
        assert!(reference.versions("DS9").is_empty());
    }

    #[test]
    fn rejects_duplicate_versions() {
        let object = Arc::new(ObjectInfo::new("demo:1", None));
        let mut reference = ObjectReference::new(Arc::clone(&object), ObjectProperties::new());
        reference.add_version(version(&object, "DS1", "DS1.0", "2010")).unwrap();
        let err = reference
            .add_version(version(&object, "DS1", "DS1.0", "2011"))
            .unwrap_err();
        assert!(matches!(err, FoxmlError::DuplicateVersion { .. }));
        // Same version id under another datastream is fine.
        reference.add_version(version(&object, "DS2", "DS1.0", "2011")).unwrap();
    }

    #[test]
    fn builder_collects_a_decoded_object() {
        let xml = r#"<digitalObject VERSION="1.1" PID="demo:2">
          <objectProperties><property NAME="info:fedora/fedora-system:def/model#state" VALUE="A"/></objectProperties>
          <datastream ID="DC" CONTROL_GROUP="X">
            <datastreamVersion ID="DC1.0" CREATED="2010-01-01T00:00:00.000Z"><xmlContent><dc/></xmlContent></datastreamVersion>
          </datastream>
        </digitalObject>"#;
        let context = DecoderContext::new(
            Arc::new(NullIdResolver),
            Arc::new(relic_content::HttpFetcher::new().unwrap()),
            DecoderConfig::default(),
        );
        let mut builder = ObjectReferenceBuilder::new();
        context.decoder(xml.as_bytes()).decode(&mut builder).unwrap();
        assert!(builder.is_complete());

        let reference = builder.take().unwrap();
        assert_eq!(reference.pid(), "demo:2");
        assert_eq!(reference.properties().len(), 1);
        assert_eq!(reference.versions("DC").len(), 1);
        assert!(builder.take().is_none());
    }

    #[test]
    fn builder_discards_aborted_objects() {
        let xml = r#"<digitalObject VERSION="1.1" PID="demo:3"><objectProperties/><bogus/></digitalObject>"#;
        let context = DecoderContext::new(
            Arc::new(NullIdResolver),
            Arc::new(relic_content::HttpFetcher::new().unwrap()),
            DecoderConfig::default(),
        );
        let mut builder = ObjectReferenceBuilder::new();
        assert!(context.decoder(xml.as_bytes()).decode(&mut builder).is_err());
        assert!(!builder.is_complete());
        assert!(builder.take().is_none());
    }
}
