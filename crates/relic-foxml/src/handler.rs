use relic_types::{ObjectInfo, ObjectProperties};

use crate::error::FoxmlError;
use crate::version::DatastreamVersion;

/// Receives the pieces of one object as the decoder finds them.
///
/// Callbacks arrive in a fixed order: `begin`, `properties` (exactly once,
/// possibly empty), zero or more `datastream_version`/`disseminator`, then
/// `complete` on success or `abort` on failure. Any error returned from a
/// callback stops decoding and triggers `abort`.
///
/// A handler that declines the object in [`wants_body`](Self::wants_body)
/// receives only `begin` and then `complete`; the body is skipped without
/// resolving or decoding any content.
pub trait ObjectHandler {
    type Error: From<FoxmlError>;

    fn begin(&mut self, object: &ObjectInfo) -> Result<(), Self::Error>;

    /// Asked once after `begin`.
    fn wants_body(&self, _object: &ObjectInfo) -> bool {
        true
    }

    fn properties(
        &mut self,
        object: &ObjectInfo,
        properties: ObjectProperties,
    ) -> Result<(), Self::Error>;

    fn datastream_version(&mut self, version: DatastreamVersion) -> Result<(), Self::Error>;

    /// Legacy FOXML 1.0 disseminator definitions. They carry nothing that is
    /// migrated; the default ignores them.
    fn disseminator(&mut self, _object: &ObjectInfo, _id: Option<&str>) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called once the whole object was read. Temporary content is still
    /// readable until this returns.
    fn complete(&mut self, object: &ObjectInfo) -> Result<(), Self::Error>;

    /// Called when decoding failed after `begin`.
    fn abort(&mut self, object: &ObjectInfo);
}
