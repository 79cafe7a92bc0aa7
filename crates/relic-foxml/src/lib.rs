//! Streaming FOXML decoder for relic.
//!
//! [`FoxmlDecoder`] reads one legacy object serialization in a single
//! forward-only pass and reports what it finds to an [`ObjectHandler`]:
//!
//! 1. `begin(object)` once the root element is read
//! 2. `properties(object, properties)` exactly once
//! 3. `datastream_version(version)` per version, in document order
//! 4. `complete(object)` or `abort(object)`
//!
//! Content bytes are never materialized by the decoder except for inline XML
//! (copied to memory) and base64 binary content (decoded to a temporary file
//! owned by the decoder). Every other representation is recorded as a lazy
//! [`ContentAccessor`](relic_content::ContentAccessor).
//!
//! Temporary files live exactly as long as the decoder: they are removed
//! after `complete`/`abort` returns and on every other exit path when the
//! decoder is dropped.

mod attrs;
mod binary;
pub mod decoder;
pub mod error;
pub mod handler;
mod inline;
mod scope;
pub mod version;

pub use decoder::{DecoderConfig, DecoderContext, FoxmlDecoder};
pub use error::{FoxmlError, FoxmlResult};
pub use handler::ObjectHandler;
pub use version::DatastreamVersion;
