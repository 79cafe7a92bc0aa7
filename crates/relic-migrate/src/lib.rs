//! Batch migration for relic.
//!
//! Wires the decoder, the timeline reconstruction and the archive writer
//! into a per-object pipeline and drives it over a source of FOXML
//! documents:
//!
//! ```text
//! ObjectSource -> FoxmlDecoder -> MigrationHandler -> ArchiveWriter -> ArchiveStore
//! ```
//!
//! Objects are processed one at a time. A failing object is reported with
//! its pid and, depending on the [`FailurePolicy`], either stops the run or
//! is recorded in the [`MigrationReport`] while the run continues.
//!
//! # Sources
//!
//! - [`DirectoryObjectSource`] -- FOXML files under a directory, sorted by path
//! - [`InMemoryObjectSource`] -- named documents held in memory

pub mod config;
pub mod error;
pub mod handler;
pub mod migrator;
pub mod pid;
pub mod source;

pub use config::{ConfigError, FailurePolicy, MigrationConfig};
pub use error::{MigrationError, MigrationResult, ObjectError};
pub use handler::{MigrationHandler, ObjectOutcome};
pub use migrator::{MigrationReport, Migrator, ObjectFailure};
pub use pid::{AcceptAll, PidFilter, PidListFilter};
pub use source::{DirectoryObjectSource, InMemoryObjectSource, ObjectSource};
