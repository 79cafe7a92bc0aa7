//! Archive writer for relic.
//!
//! Turns an object's reconstructed timeline into OCFL versions: one version
//! per timeline entry, each carrying the changed binaries, their generated
//! resource headers and descriptions, and (in the first version) the object
//! root container.
//!
//! # Key Types
//!
//! - [`ArchiveWriter`] -- writes one object per call through an [`ArchiveStore`](relic_ocfl::ArchiveStore) session
//! - [`ResourceHeaders`] -- JSON header written next to every resource
//! - [`paths`] -- fixed mapping from resource role and name to storage paths
//! - [`Triple`] -- N-Triples rendering of properties and descriptions

pub mod description;
pub mod error;
pub mod headers;
pub mod mime;
pub mod paths;
pub mod rdf;
pub mod writer;

pub use description::DescriptionDetail;
pub use error::{ArchiveError, ArchiveResult};
pub use headers::{ExternalHandling, InteractionModel, ResourceHeaders};
pub use paths::ResourceRole;
pub use rdf::{Term, Triple};
pub use writer::{ArchiveWriter, CommitSettings, WriteSummary, WriterConfig};
