//! Versioned, content-addressed storage for migrated objects.
//!
//! Each destination object is an OCFL object: an append-only sequence of
//! versions whose logical files are addressed by content digest, so
//! identical bytes are stored once no matter how many versions or paths
//! refer to them.
//!
//! # Sessions
//!
//! Writes go through an [`ObjectSession`]. A session stages any number of
//! versions (`put`/`remove` followed by `commit`) without making anything
//! visible. [`ObjectSession::publish`] then makes the staged versions
//! visible in order, each one atomically; [`ObjectSession::abort`] (or
//! dropping the session) discards them.
//!
//! # Storage Backends
//!
//! All backends implement the [`ArchiveStore`] trait:
//!
//! - [`InMemoryArchiveStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsArchiveStore`] -- OCFL 1.1 storage root on the local file system
//!
//! # Design Rules
//!
//! 1. Published versions are immutable.
//! 2. A version becomes visible only when its inventory is in place.
//! 3. Content is stored once per digest per object.
//! 4. One session per object at a time.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod inventory;
pub mod layout;
pub mod memory;
mod staging;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsArchiveStore;
pub use inventory::{Inventory, InventoryVersion, User};
pub use layout::{object_root_path, validate_logical_path};
pub use memory::InMemoryArchiveStore;
pub use traits::{ArchiveStore, CommitInfo, ObjectSession, ObjectVersion, StagedFile};
