use relic_archive::{ArchiveWriter, WriteSummary};
use relic_foxml::{DatastreamVersion, FoxmlError, ObjectHandler};
use relic_timeline::ObjectReferenceBuilder;
use relic_types::{ObjectInfo, ObjectProperties};
use tracing::{info, warn};

use crate::error::ObjectError;
use crate::pid::PidFilter;

/// What happened to one decoded object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectOutcome {
    Written { pid: String, summary: WriteSummary },
    /// Rejected by the pid filter.
    Skipped { pid: String },
}

impl ObjectOutcome {
    pub fn pid(&self) -> &str {
        match self {
            Self::Written { pid, .. } | Self::Skipped { pid } => pid,
        }
    }
}

/// Decoder callbacks for one object: accumulate, then write on `complete`.
///
/// Writing happens inside `complete` because decoded binary content only
/// lives until the decoder returns. Objects rejected by the pid filter are
/// settled in `begin` and their body is never decoded.
#[derive(Debug)]
pub struct MigrationHandler<'a> {
    builder: ObjectReferenceBuilder,
    writer: &'a ArchiveWriter,
    filter: &'a dyn PidFilter,
    pid: Option<String>,
    outcome: Option<ObjectOutcome>,
}

impl<'a> MigrationHandler<'a> {
    pub fn new(writer: &'a ArchiveWriter, filter: &'a dyn PidFilter) -> Self {
        Self {
            builder: ObjectReferenceBuilder::new(),
            writer,
            filter,
            pid: None,
            outcome: None,
        }
    }

    /// Pid of the object being decoded, once the root element was read.
    pub fn pid(&self) -> Option<&str> {
        self.pid.as_deref()
    }

    pub fn into_outcome(self) -> Option<ObjectOutcome> {
        self.outcome
    }
}

impl ObjectHandler for MigrationHandler<'_> {
    type Error = ObjectError;

    fn begin(&mut self, object: &ObjectInfo) -> Result<(), ObjectError> {
        let pid = object.pid().to_string();
        self.pid = Some(pid.clone());
        self.outcome = None;
        if !self.filter.accept(&pid) {
            info!(pid = %pid, "skipping object rejected by pid filter");
            self.outcome = Some(ObjectOutcome::Skipped { pid });
            return Ok(());
        }
        Ok(self.builder.begin(object)?)
    }

    fn wants_body(&self, _object: &ObjectInfo) -> bool {
        !matches!(self.outcome, Some(ObjectOutcome::Skipped { .. }))
    }

    fn properties(
        &mut self,
        object: &ObjectInfo,
        properties: ObjectProperties,
    ) -> Result<(), ObjectError> {
        Ok(self.builder.properties(object, properties)?)
    }

    fn datastream_version(&mut self, version: DatastreamVersion) -> Result<(), ObjectError> {
        Ok(self.builder.datastream_version(version)?)
    }

    fn disseminator(&mut self, object: &ObjectInfo, id: Option<&str>) -> Result<(), ObjectError> {
        warn!(pid = object.pid(), disseminator = ?id, "legacy disseminator not migrated");
        Ok(())
    }

    fn complete(&mut self, object: &ObjectInfo) -> Result<(), ObjectError> {
        if self.outcome.is_some() {
            return Ok(());
        }
        self.builder.complete(object)?;
        let reference = self.builder.take().ok_or_else(|| {
            FoxmlError::Malformed(format!("object {} completed without properties", object.pid()))
        })?;
        let pid = object.pid().to_string();
        let summary = self.writer.write_object(&reference)?;
        self.outcome = Some(ObjectOutcome::Written { pid, summary });
        Ok(())
    }

    fn abort(&mut self, object: &ObjectInfo) {
        self.builder.abort(object);
        self.outcome = None;
    }
}
