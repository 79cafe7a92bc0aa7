//! Digest primitives for relic.
//!
//! Provides the checksum algorithms a legacy repository may declare (MD5,
//! SHA-1, SHA-256, SHA-384, SHA-512), a [`DigestingReader`] that digests
//! content while it is streamed to storage, and the synthetic state token
//! written into generated resource headers.
//!
//! All digest operations wrap the RustCrypto hash crates; no custom
//! cryptography.

pub mod hasher;
pub mod reader;
pub mod token;

pub use hasher::{ContentHasher, DigestAlgorithm, DigestError};
pub use reader::{DigestSummary, DigestingReader};
pub use token::state_token;
