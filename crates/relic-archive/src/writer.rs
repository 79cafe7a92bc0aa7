use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use relic_crypto::{state_token, DigestAlgorithm, DigestingReader};
use relic_foxml::DatastreamVersion;
use relic_ocfl::{ArchiveStore, CommitInfo, ObjectSession};
use relic_timeline::{ObjectReference, ObjectVersionReference};
use relic_types::{ControlGroup, DatastreamState, LegacyTimestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::description::{binary_triples, root_triples, DescriptionDetail};
use crate::error::{ArchiveError, ArchiveResult};
use crate::headers::{ExternalHandling, InteractionModel, ResourceHeaders};
use crate::mime::qualified_name;
use crate::paths;
use crate::rdf::to_ntriples;

/// Prefix of every object resource id.
pub const OBJECT_ID_PREFIX: &str = "info:fedora/";

/// Resource id of the archive group for `pid`.
pub fn object_resource_id(pid: &str) -> String {
    format!("{OBJECT_ID_PREFIX}{pid}")
}

/// Commit metadata shared by every version written in one run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitSettings {
    pub message: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_address: Option<String>,
}

impl Default for CommitSettings {
    fn default() -> Self {
        Self {
            message: "Migrated from FOXML".to_string(),
            user_name: "fedoraAdmin".to_string(),
            user_address: Some("info:fedora/fedoraAdmin".to_string()),
        }
    }
}

/// Options controlling how objects are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterConfig {
    /// Import External and Redirect content instead of referencing it.
    pub fetch_external_content: bool,
    /// Fail objects whose declared digests do not match their content.
    pub validate_checksums: bool,
    /// Qualify binary names with an extension derived from the mime type.
    pub add_file_extensions: bool,
    pub description_detail: DescriptionDetail,
    /// Treat Inactive objects and datastreams as deleted.
    pub delete_inactive: bool,
    /// Recorded as creator and last modifier of every resource.
    pub migration_actor: String,
    /// Fixed migration time; the current time when `None`.
    pub migration_timestamp: Option<DateTime<Utc>>,
    pub commit: CommitSettings,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            fetch_external_content: false,
            validate_checksums: true,
            add_file_extensions: false,
            description_detail: DescriptionDetail::Minimal,
            delete_inactive: false,
            migration_actor: "fedoraAdmin".to_string(),
            migration_timestamp: None,
            commit: CommitSettings::default(),
        }
    }
}

/// What writing one object produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub object_id: String,
    /// Published version ids, oldest first.
    pub versions: Vec<String>,
    /// Binaries written, including referenced external ones.
    pub binaries: usize,
    /// Binaries recorded by reference only.
    pub external: usize,
    pub bytes_written: u64,
    /// Binaries whose bytes were already stored.
    pub deduplicated: usize,
}

/// Writes reconstructed objects into an [`ArchiveStore`].
///
/// Each object is written through one store session: every timeline entry
/// is staged and committed in order, and the session is published only
/// after all of them succeeded. Any failure aborts the session, so an
/// object is either written completely or not at all.
pub struct ArchiveWriter {
    store: Arc<dyn ArchiveStore>,
    config: WriterConfig,
}

impl ArchiveWriter {
    pub fn new(store: Arc<dyn ArchiveStore>, config: WriterConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ArchiveStore> {
        &self.store
    }

    /// Reconstruct the object's timeline and write it.
    pub fn write_object(&self, reference: &ObjectReference) -> ArchiveResult<WriteSummary> {
        let timeline = reference.timeline();
        self.write_timeline(reference, &timeline)
    }

    /// Write an already reconstructed timeline, one version per entry.
    ///
    /// An empty timeline produces a single version holding only the object
    /// root, dated by the object's creation date.
    pub fn write_timeline(
        &self,
        reference: &ObjectReference,
        timeline: &[ObjectVersionReference<'_>],
    ) -> ArchiveResult<WriteSummary> {
        let object_id = object_resource_id(reference.pid());
        let mut session = self.store.open_session(&object_id)?;
        let mut pass = ObjectPass {
            config: &self.config,
            storage_algorithm: self.store.digest_algorithm(),
            reference,
            object_id: object_id.clone(),
            now: self.config.migration_timestamp.unwrap_or_else(Utc::now),
            names: HashMap::new(),
            summary: WriteSummary {
                object_id: object_id.clone(),
                ..WriteSummary::default()
            },
        };

        if let Err(e) = pass.stage(session.as_mut(), timeline) {
            warn!(object = %object_id, error = %e, "abandoning object");
            session.abort();
            return Err(e);
        }

        let mut summary = pass.summary;
        summary.versions = session.publish()?;
        info!(
            object = %object_id,
            versions = summary.versions.len(),
            binaries = summary.binaries,
            bytes = summary.bytes_written,
            "object written"
        );
        Ok(summary)
    }
}

impl fmt::Debug for ArchiveWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}

/// State for writing one object.
struct ObjectPass<'a> {
    config: &'a WriterConfig,
    storage_algorithm: DigestAlgorithm,
    reference: &'a ObjectReference,
    object_id: String,
    now: DateTime<Utc>,
    /// Current binary name per datastream id.
    names: HashMap<String, String>,
    summary: WriteSummary,
}

impl ObjectPass<'_> {
    fn stage(
        &mut self,
        session: &mut dyn ObjectSession,
        timeline: &[ObjectVersionReference<'_>],
    ) -> ArchiveResult<()> {
        if timeline.is_empty() {
            let created = self
                .reference
                .properties()
                .created_date()
                .and_then(|date| LegacyTimestamp::parse(date).ok())
                .map(|ts| *ts.as_datetime())
                .unwrap_or(self.now);
            self.write_root(session)?;
            let id = session.commit(self.commit_info(created))?;
            debug!(object = %self.object_id, version = %id, "staged root-only version");
            return Ok(());
        }

        for entry in timeline {
            if entry.is_first() {
                self.write_root(session)?;
            }
            for version in entry.changed() {
                self.write_binary(session, version)?;
            }
            let created = LegacyTimestamp::parse(entry.version_date())?;
            let id = session.commit(self.commit_info(*created.as_datetime()))?;
            debug!(
                object = %self.object_id,
                version = %id,
                date = entry.version_date(),
                changed = entry.changed().len(),
                "staged version"
            );
        }
        Ok(())
    }

    fn commit_info(&self, created: DateTime<Utc>) -> CommitInfo {
        let settings = &self.config.commit;
        let info = CommitInfo::new(created, &settings.message, &settings.user_name);
        match &settings.user_address {
            Some(address) => info.with_user_address(address),
            None => info,
        }
    }

    fn is_deleted(&self, state: Option<DatastreamState>) -> bool {
        match state {
            Some(DatastreamState::Deleted) => true,
            Some(DatastreamState::Inactive) => self.config.delete_inactive,
            _ => false,
        }
    }

    fn headers(&self, id: &str, parent: &str, model: InteractionModel) -> ResourceHeaders {
        let mut headers =
            ResourceHeaders::new(id, parent, model, &self.config.migration_actor, &self.now);
        headers.archival_group_id = Some(self.object_id.clone());
        headers
    }

    fn write_root(&mut self, session: &mut dyn ObjectSession) -> ArchiveResult<()> {
        let properties = self.reference.properties();
        let mut headers =
            ResourceHeaders::object_root(&self.object_id, &self.config.migration_actor, &self.now);
        headers.deleted = self.is_deleted(properties.state());

        let triples = root_triples(&self.object_id, properties);
        put_bytes(session, &paths::root_content_path(), to_ntriples(&triples).as_bytes())?;
        put_bytes(session, &paths::root_header_path(), &headers.to_json()?)?;
        Ok(())
    }

    fn write_binary(
        &mut self,
        session: &mut dyn ObjectSession,
        version: &DatastreamVersion,
    ) -> ArchiveResult<()> {
        let datastream = version.datastream();
        let dsid = datastream.id();
        let mime_type = Some(version.mime_type()).filter(|m| !m.is_empty());
        let name = if self.config.add_file_extensions {
            let qualified = qualified_name(dsid, mime_type);
            // Another datastream of the object is already named that.
            if qualified != dsid && self.reference.datastream_ids().any(|id| id == qualified) {
                dsid.to_string()
            } else {
                qualified
            }
        } else {
            dsid.to_string()
        };
        if let Some(previous) = self.names.insert(dsid.to_string(), name.clone()) {
            if previous != name {
                remove_binary(session, &previous)?;
            }
        }

        let binary_id = format!("{}/{}", self.object_id, dsid);
        let content_path = paths::binary_content_path(&name);
        let mut headers = self.headers(&binary_id, &self.object_id, InteractionModel::NonRdfSource);
        headers.mime_type = mime_type.map(str::to_string);
        headers.filename = Some(name.clone());
        headers.state_token = Some(state_token(version.created())?);
        headers.deleted = self.is_deleted(Some(datastream.state()));

        let declared = self.declared_digest(version);
        if datastream.control_group().is_external() && !self.config.fetch_external_content {
            let url = version
                .external_url()
                .ok_or_else(|| ArchiveError::MissingExternalUrl {
                    datastream: dsid.to_string(),
                    version: version.id().to_string(),
                })?;
            headers.external_url = Some(url.to_string());
            headers.external_handling = Some(match datastream.control_group() {
                ControlGroup::Redirect => ExternalHandling::Redirect,
                _ => ExternalHandling::Proxy,
            });
            headers.content_size = version.size();
            if let Some((algorithm, expected)) = declared {
                headers.digests.push(algorithm.urn(expected));
            }
            // An earlier version may have stored the bytes.
            session.remove(&content_path)?;
            self.summary.external += 1;
        } else {
            let algorithm = declared.map_or(self.storage_algorithm, |(alg, _)| alg);
            let content = version.content().open()?;
            let mut reader = DigestingReader::new(content, &[algorithm]);
            let staged = session.put(&content_path, &mut reader)?;
            let computed = reader.finish();
            let actual = computed.get(algorithm).unwrap_or_default().to_string();

            if let Some((algorithm, expected)) = declared {
                if self.config.validate_checksums && !expected.eq_ignore_ascii_case(&actual) {
                    return Err(ArchiveError::DigestMismatch {
                        datastream: dsid.to_string(),
                        algorithm: algorithm.to_string(),
                        expected: expected.to_string(),
                        actual,
                    });
                }
            }

            headers.content_size = Some(computed.size);
            headers.digests.push(algorithm.urn(&actual));
            headers.content_path = Some(content_path.clone());
            self.summary.bytes_written += computed.size;
            if staged.deduplicated {
                self.summary.deduplicated += 1;
            }
        }
        put_bytes(session, &paths::binary_header_path(&name), &headers.to_json()?)?;

        let description_id = format!("{binary_id}/fcr:metadata");
        let mut description =
            self.headers(&description_id, &binary_id, InteractionModel::NonRdfSourceDescription);
        description.deleted = headers.deleted;
        let triples = binary_triples(
            &binary_id,
            version,
            self.config.description_detail,
            headers.digests.first().map(String::as_str),
            headers.content_size,
        );
        put_bytes(
            session,
            &paths::description_content_path(&name),
            to_ntriples(&triples).as_bytes(),
        )?;
        put_bytes(
            session,
            &paths::description_header_path(&name),
            &description.to_json()?,
        )?;

        self.summary.binaries += 1;
        debug!(
            object = %self.object_id,
            datastream = dsid,
            version = version.id(),
            external = headers.is_external(),
            "staged binary"
        );
        Ok(())
    }

    /// The declared digest, if present and in a supported algorithm.
    fn declared_digest<'v>(&self, version: &'v DatastreamVersion) -> Option<(DigestAlgorithm, &'v str)> {
        let digest = version.digest().filter(|d| !d.is_disabled() && !d.digest.is_empty())?;
        match digest.algorithm.parse::<DigestAlgorithm>() {
            Ok(algorithm) => Some((algorithm, digest.digest.as_str())),
            Err(_) => {
                warn!(
                    object = %self.object_id,
                    datastream = version.datastream().id(),
                    algorithm = %digest.algorithm,
                    "declared digest uses an unsupported algorithm, not validated"
                );
                None
            }
        }
    }
}

fn put_bytes(session: &mut dyn ObjectSession, path: &str, bytes: &[u8]) -> ArchiveResult<()> {
    let mut reader: &[u8] = bytes;
    session.put(path, &mut reader as &mut dyn Read)?;
    Ok(())
}

/// Remove every file stored for binary `name`.
fn remove_binary(session: &mut dyn ObjectSession, name: &str) -> ArchiveResult<()> {
    for path in [
        paths::binary_content_path(name),
        paths::binary_header_path(name),
        paths::description_content_path(name),
        paths::description_header_path(name),
    ] {
        session.remove(&path)?;
    }
    Ok(())
}
