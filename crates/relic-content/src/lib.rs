//! Lazy content access for relic.
//!
//! A [`ContentAccessor`] stands for "bytes available somewhere". Decoding an
//! object never reads content; it only records where the bytes can be found.
//! The archive writer opens each accessor exactly when it streams the content
//! into storage.
//!
//! # Accessors
//!
//! - [`MemoryContent`] -- bytes held in memory (inline XML)
//! - [`FileContent`] -- a file on disk; temporary files become unavailable
//!   once the decoder that created them is dropped
//! - [`UrlContent`] -- fetched through a [`UrlFetcher`] on `open()`
//!
//! # Collaborators
//!
//! - [`UrlFetcher`] / [`HttpFetcher`] -- HTTP(S) and `file:` URL retrieval
//! - [`InternalIdResolver`] -- maps legacy internal content ids to accessors;
//!   [`DirectoryIdResolver`] indexes a legacy datastream store on disk

pub mod accessor;
pub mod error;
pub mod fetch;
pub mod resolver;

pub use accessor::{ContentAccessor, FileContent, MemoryContent, UrlContent};
pub use error::{ContentError, ContentResult};
pub use fetch::{substitute_local_server, HttpFetcher, UrlFetcher, LOCAL_SERVER_TOKEN};
pub use resolver::{
    internal_id_from_file_name, DirectoryIdResolver, InMemoryIdResolver, InternalIdResolver,
    NullIdResolver,
};
