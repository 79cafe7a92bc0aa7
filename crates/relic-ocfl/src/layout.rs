//! Storage root layout: where objects live and which logical paths are legal.

use std::path::PathBuf;

use relic_crypto::{ContentHasher, DigestAlgorithm};

use crate::error::{StoreError, StoreResult};

/// Storage root conformance declaration.
pub const ROOT_NAMASTE: (&str, &str) = ("0=ocfl_1.1", "ocfl_1.1\n");
/// Object root conformance declaration.
pub const OBJECT_NAMASTE: (&str, &str) = ("0=ocfl_object_1.1", "ocfl_object_1.1\n");
/// Storage layout extension used for object placement.
pub const LAYOUT_EXTENSION: &str = "0004-hashed-n-tuple-storage-layout";
/// Name of the layout description file at the storage root.
pub const LAYOUT_FILE: &str = "ocfl_layout.json";

const TUPLE_SIZE: usize = 3;
const NUMBER_OF_TUPLES: usize = 3;

/// Relative path of an object's root directory.
///
/// The SHA-256 of the object id is split into three 3-character tuples
/// followed by the full digest: `3c0/ff4/240/3c0ff4240c...`.
pub fn object_root_path(object_id: &str) -> PathBuf {
    let digest = ContentHasher::digest_hex(DigestAlgorithm::Sha256, object_id.as_bytes());
    let mut path = PathBuf::new();
    for i in 0..NUMBER_OF_TUPLES {
        path.push(&digest[i * TUPLE_SIZE..(i + 1) * TUPLE_SIZE]);
    }
    path.push(&digest);
    path
}

/// JSON body of the layout extension's `config.json`.
pub fn layout_config() -> serde_json::Value {
    serde_json::json!({
        "extensionName": LAYOUT_EXTENSION,
        "digestAlgorithm": "sha256",
        "tupleSize": TUPLE_SIZE,
        "numberOfTuples": NUMBER_OF_TUPLES,
        "shortObjectRoot": false,
    })
}

/// JSON body of `ocfl_layout.json`.
pub fn layout_description() -> serde_json::Value {
    serde_json::json!({
        "extension": LAYOUT_EXTENSION,
        "description": "Hashed Truncated N-tuple Trees for Object ID Mapping",
    })
}

/// Reject logical paths that could escape the content directory or collide
/// with directory structure.
pub fn validate_logical_path(path: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };
    if path.is_empty() {
        return Err(invalid("empty path"));
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Err(invalid("leading or trailing slash"));
    }
    if path.contains('\\') || path.contains('\0') {
        return Err(invalid("backslash or NUL character"));
    }
    for segment in path.split('/') {
        match segment {
            "" => return Err(invalid("empty path segment")),
            "." | ".." => return Err(invalid("relative path segment")),
            _ => {}
        }
    }
    Ok(())
}
