use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use chrono::{DateTime, SecondsFormat, Utc};
use relic_crypto::DigestAlgorithm;

use crate::error::StoreResult;

/// Metadata recorded with each committed version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitInfo {
    pub created: DateTime<Utc>,
    pub message: String,
    pub user_name: String,
    pub user_address: Option<String>,
}

impl CommitInfo {
    pub fn new(created: DateTime<Utc>, message: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            created,
            message: message.into(),
            user_name: user_name.into(),
            user_address: None,
        }
    }

    pub fn with_user_address(mut self, address: impl Into<String>) -> Self {
        self.user_address = Some(address.into());
        self
    }

    /// `created` as written into inventories.
    pub fn created_string(&self) -> String {
        self.created.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Outcome of staging one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedFile {
    /// Hex digest in the store's digest algorithm.
    pub digest: String,
    pub size: u64,
    /// The bytes were already stored (or staged) and no new copy was kept.
    pub deduplicated: bool,
}

/// A published version of an object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectVersion {
    /// Version id (`v1`, `v2`, ...).
    pub id: String,
    pub created: String,
    pub message: Option<String>,
    pub user_name: Option<String>,
    pub user_address: Option<String>,
    /// Logical path to content digest.
    pub state: BTreeMap<String, String>,
}

impl ObjectVersion {
    pub fn contains(&self, path: &str) -> bool {
        self.state.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.state.keys().map(String::as_str)
    }
}

/// Staged writes against one object.
///
/// Changes made with `put`/`remove` form the next version once `commit` is
/// called. Nothing is visible to readers until `publish`.
pub trait ObjectSession: Send {
    fn object_id(&self) -> &str;

    /// Stage `content` at logical `path`, replacing any file already there.
    fn put(&mut self, path: &str, content: &mut dyn Read) -> StoreResult<StagedFile>;

    /// Remove a logical path. Returns `true` if it existed.
    fn remove(&mut self, path: &str) -> StoreResult<bool>;

    /// Whether `path` exists in the working state.
    fn contains(&self, path: &str) -> bool;

    /// Close the current changes as a version. Returns the version id it
    /// will have once published.
    fn commit(&mut self, info: CommitInfo) -> StoreResult<String>;

    /// Number of committed but unpublished versions.
    fn staged_versions(&self) -> usize;

    /// Make every committed version visible, in order. Returns their ids.
    fn publish(self: Box<Self>) -> StoreResult<Vec<String>>;

    /// Discard everything staged in this session.
    fn abort(self: Box<Self>);
}

/// Versioned, content-addressed object storage.
///
/// All implementations must satisfy these invariants:
/// - Published versions never change.
/// - A version is either fully visible or not visible at all.
/// - Identical content within one object is stored once.
/// - At most one session per object is open at a time.
pub trait ArchiveStore: Send + Sync + fmt::Debug {
    /// Algorithm used to address content of new objects.
    fn digest_algorithm(&self) -> DigestAlgorithm;

    /// Open a session for `object_id`, creating the object on first publish.
    fn open_session(&self, object_id: &str) -> StoreResult<Box<dyn ObjectSession + '_>>;

    fn exists(&self, object_id: &str) -> StoreResult<bool>;

    /// Published versions, oldest first. Empty if the object does not exist.
    fn versions(&self, object_id: &str) -> StoreResult<Vec<ObjectVersion>>;

    /// Read a logical file from `version`, or from the head when `None`.
    ///
    /// Returns `Ok(None)` if the object exists but the path does not.
    fn read_file(
        &self,
        object_id: &str,
        version: Option<&str>,
        path: &str,
    ) -> StoreResult<Option<Vec<u8>>>;

    /// The newest published version.
    fn head(&self, object_id: &str) -> StoreResult<Option<ObjectVersion>> {
        Ok(self.versions(object_id)?.pop())
    }
}
