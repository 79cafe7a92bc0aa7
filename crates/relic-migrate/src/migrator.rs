use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

use relic_archive::ArchiveWriter;
use relic_content::{DirectoryIdResolver, HttpFetcher, InternalIdResolver, NullIdResolver};
use relic_foxml::{DecoderContext, FoxmlError};
use relic_ocfl::FsArchiveStore;
use tracing::{error, info};

use crate::config::{FailurePolicy, MigrationConfig};
use crate::error::{MigrationError, MigrationResult, ObjectError};
use crate::handler::{MigrationHandler, ObjectOutcome};
use crate::pid::{AcceptAll, PidFilter, PidListFilter};
use crate::source::ObjectSource;

/// A failed object recorded under [`FailurePolicy::Continue`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectFailure {
    /// Source document name.
    pub document: String,
    /// Object pid, or the document name if the pid was never read.
    pub pid: String,
    pub message: String,
}

/// Totals for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub documents: usize,
    pub migrated: usize,
    pub skipped: usize,
    pub versions: usize,
    pub binaries: usize,
    pub bytes_written: u64,
    pub failures: Vec<ObjectFailure>,
}

impl MigrationReport {
    /// Whether every document was migrated or deliberately skipped.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: &ObjectOutcome) {
        match outcome {
            ObjectOutcome::Written { summary, .. } => {
                self.migrated += 1;
                self.versions += summary.versions.len();
                self.binaries += summary.binaries;
                self.bytes_written += summary.bytes_written;
            }
            ObjectOutcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Drives decode, reconstruction and writing over a source of documents.
pub struct Migrator {
    context: DecoderContext,
    writer: ArchiveWriter,
    filter: Box<dyn PidFilter>,
    policy: FailurePolicy,
}

impl Migrator {
    pub fn new(
        context: DecoderContext,
        writer: ArchiveWriter,
        filter: Box<dyn PidFilter>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            context,
            writer,
            filter,
            policy,
        }
    }

    /// Build a migrator writing to a filesystem OCFL root.
    ///
    /// The configuration is validated first; nothing is touched on disk if
    /// it is invalid.
    pub fn from_config(config: &MigrationConfig) -> MigrationResult<Self> {
        config.validate()?;
        let writer_config = config.writer_config()?;
        let store = FsArchiveStore::open_or_init(&config.storage_root, config.storage_algorithm()?)?;

        let resolver: Arc<dyn InternalIdResolver> = match &config.datastream_store {
            Some(dir) => Arc::new(DirectoryIdResolver::build(dir)?),
            None => Arc::new(NullIdResolver),
        };
        let filter: Box<dyn PidFilter> = match &config.pid_list {
            Some(path) => Box::new(PidListFilter::load(path)?),
            None => Box::new(AcceptAll),
        };
        let context = DecoderContext::new(
            resolver,
            Arc::new(HttpFetcher::new()?),
            config.decoder_config(),
        );

        info!(
            storage = %config.storage_root.display(),
            digest = %config.storage_digest,
            policy = ?config.failure_policy,
            "migrator ready"
        );
        Ok(Self::new(
            context,
            ArchiveWriter::new(Arc::new(store), writer_config),
            filter,
            config.failure_policy,
        ))
    }

    pub fn writer(&self) -> &ArchiveWriter {
        &self.writer
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Migrate one serialized object. `name` identifies the document in
    /// errors raised before its pid is known.
    pub fn migrate_document<R: BufRead>(&self, name: &str, input: R) -> MigrationResult<ObjectOutcome> {
        let mut handler = MigrationHandler::new(&self.writer, self.filter.as_ref());
        match self.context.decoder(input).decode(&mut handler) {
            Ok(object) => handler.into_outcome().ok_or_else(|| MigrationError::ObjectFailed {
                pid: object.pid().to_string(),
                source: ObjectError::Decode(FoxmlError::Malformed(
                    "decoding finished without completing the object".into(),
                )),
            }),
            Err(source) => Err(MigrationError::ObjectFailed {
                pid: handler.pid().unwrap_or(name).to_string(),
                source,
            }),
        }
    }

    /// Migrate every document of `source`, in order.
    pub fn run(&self, source: &dyn ObjectSource) -> MigrationResult<MigrationReport> {
        let mut report = MigrationReport::default();
        for name in source.names() {
            report.documents += 1;
            let result = source
                .open(&name)
                .map_err(|e| MigrationError::ObjectFailed {
                    pid: name.clone(),
                    source: ObjectError::Io(e),
                })
                .and_then(|input| self.migrate_document(&name, input));

            match result {
                Ok(outcome) => report.record(&outcome),
                Err(MigrationError::ObjectFailed { pid, source: cause }) => {
                    error!(pid = %pid, document = %name, error = %cause, "object failed");
                    if self.policy == FailurePolicy::Halt {
                        return Err(MigrationError::ObjectFailed { pid, source: cause });
                    }
                    report.failures.push(ObjectFailure {
                        document: name,
                        pid,
                        message: cause.to_string(),
                    });
                }
                Err(other) => return Err(other),
            }
        }
        info!(
            documents = report.documents,
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failures.len(),
            versions = report.versions,
            "migration finished"
        );
        Ok(report)
    }
}

impl fmt::Debug for Migrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("context", &self.context)
            .field("writer", &self.writer)
            .field("filter", &self.filter)
            .field("policy", &self.policy)
            .finish()
    }
}
