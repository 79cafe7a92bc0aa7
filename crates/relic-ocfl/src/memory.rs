use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::{Arc, Mutex, RwLock};

use relic_crypto::{ContentHasher, DigestAlgorithm};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::staging::WorkingState;
use crate::traits::{ArchiveStore, CommitInfo, ObjectSession, ObjectVersion, StagedFile};

/// In-memory, HashMap-based archive store.
///
/// Intended for tests and embedding. Content blobs are shared across all
/// objects and versions by digest.
pub struct InMemoryArchiveStore {
    algorithm: DigestAlgorithm,
    objects: RwLock<HashMap<String, Vec<ObjectVersion>>>,
    blobs: RwLock<HashMap<String, Arc<Vec<u8>>>>,
    open: Mutex<HashSet<String>>,
}

impl InMemoryArchiveStore {
    /// Create a new empty store addressing content by SHA-512.
    pub fn new() -> Self {
        Self::with_algorithm(DigestAlgorithm::Sha512)
    }

    pub fn with_algorithm(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            objects: RwLock::new(HashMap::new()),
            blobs: RwLock::new(HashMap::new()),
            open: Mutex::new(HashSet::new()),
        }
    }

    /// Number of objects with at least one published version.
    pub fn object_count(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Number of distinct content blobs stored.
    pub fn blob_count(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|blob| blob.len() as u64)
            .sum()
    }

    /// Sorted ids of all stored objects.
    pub fn object_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .objects
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    fn release(&self, object_id: &str) {
        self.open.lock().expect("lock poisoned").remove(object_id);
    }
}

impl Default for InMemoryArchiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryArchiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryArchiveStore")
            .field("algorithm", &self.algorithm)
            .field("object_count", &self.object_count())
            .field("blob_count", &self.blob_count())
            .finish()
    }
}

impl ArchiveStore for InMemoryArchiveStore {
    fn digest_algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn open_session(&self, object_id: &str) -> StoreResult<Box<dyn ObjectSession + '_>> {
        if !self
            .open
            .lock()
            .expect("lock poisoned")
            .insert(object_id.to_string())
        {
            return Err(StoreError::Busy(object_id.to_string()));
        }
        let objects = self.objects.read().expect("lock poisoned");
        let versions = objects.get(object_id);
        let head_state = versions
            .and_then(|v| v.last())
            .map(|v| v.state.clone())
            .unwrap_or_default();
        let base_head = versions.map_or(0, Vec::len) as u32;
        Ok(Box::new(MemorySession {
            store: self,
            object_id: object_id.to_string(),
            state: WorkingState::new(head_state, base_head),
            staged_blobs: HashMap::new(),
        }))
    }

    fn exists(&self, object_id: &str) -> StoreResult<bool> {
        Ok(self
            .objects
            .read()
            .expect("lock poisoned")
            .contains_key(object_id))
    }

    fn versions(&self, object_id: &str) -> StoreResult<Vec<ObjectVersion>> {
        Ok(self
            .objects
            .read()
            .expect("lock poisoned")
            .get(object_id)
            .cloned()
            .unwrap_or_default())
    }

    fn read_file(
        &self,
        object_id: &str,
        version: Option<&str>,
        path: &str,
    ) -> StoreResult<Option<Vec<u8>>> {
        let objects = self.objects.read().expect("lock poisoned");
        let versions = objects
            .get(object_id)
            .ok_or_else(|| StoreError::NotFound(object_id.to_string()))?;
        let selected = match version {
            Some(id) => versions.iter().find(|v| v.id == id).ok_or_else(|| {
                StoreError::UnknownVersion {
                    object: object_id.to_string(),
                    version: id.to_string(),
                }
            })?,
            None => versions
                .last()
                .ok_or_else(|| StoreError::NotFound(object_id.to_string()))?,
        };
        let Some(digest) = selected.state.get(path) else {
            return Ok(None);
        };
        let blobs = self.blobs.read().expect("lock poisoned");
        match blobs.get(digest) {
            Some(blob) => Ok(Some(blob.as_ref().clone())),
            None => Err(StoreError::Corrupt {
                location: format!("{object_id}/{path}"),
                reason: format!("missing blob {digest}"),
            }),
        }
    }
}

/// Session against an [`InMemoryArchiveStore`].
struct MemorySession<'a> {
    store: &'a InMemoryArchiveStore,
    object_id: String,
    state: WorkingState,
    staged_blobs: HashMap<String, Vec<u8>>,
}

impl ObjectSession for MemorySession<'_> {
    fn object_id(&self) -> &str {
        &self.object_id
    }

    fn put(&mut self, path: &str, content: &mut dyn Read) -> StoreResult<StagedFile> {
        self.state.check_path(path)?;
        let mut bytes = Vec::new();
        content.read_to_end(&mut bytes)?;
        let digest = ContentHasher::digest_hex(self.store.algorithm, &bytes);
        let size = bytes.len() as u64;
        let deduplicated = self.staged_blobs.contains_key(&digest)
            || self
                .store
                .blobs
                .read()
                .expect("lock poisoned")
                .contains_key(&digest);
        if !deduplicated {
            self.staged_blobs.insert(digest.clone(), bytes);
        }
        self.state.put(path, digest.clone())?;
        Ok(StagedFile {
            digest,
            size,
            deduplicated,
        })
    }

    fn remove(&mut self, path: &str) -> StoreResult<bool> {
        Ok(self.state.remove(path))
    }

    fn contains(&self, path: &str) -> bool {
        self.state.contains(path)
    }

    fn commit(&mut self, info: CommitInfo) -> StoreResult<String> {
        Ok(self.state.commit(info))
    }

    fn staged_versions(&self) -> usize {
        self.state.staged()
    }

    fn publish(mut self: Box<Self>) -> StoreResult<Vec<String>> {
        let store = self.store;
        let object_id = self.object_id.clone();
        let staged = std::mem::take(&mut self.state).into_versions(&object_id);
        let staged_blobs = std::mem::take(&mut self.staged_blobs);

        {
            let mut blobs = store.blobs.write().expect("lock poisoned");
            for (digest, bytes) in staged_blobs {
                blobs.entry(digest).or_insert_with(|| Arc::new(bytes));
            }
        }
        let mut objects = store.objects.write().expect("lock poisoned");
        let versions = objects.entry(object_id.clone()).or_default();
        let mut ids = Vec::with_capacity(staged.len());
        for version in staged {
            let id = format!("v{}", versions.len() + 1);
            versions.push(ObjectVersion {
                id: id.clone(),
                created: version.info.created_string(),
                message: Some(version.info.message),
                user_name: Some(version.info.user_name),
                user_address: version.info.user_address,
                state: version.state,
            });
            ids.push(id);
        }
        if versions.is_empty() {
            objects.remove(&object_id);
        }
        drop(objects);
        debug!(object = %object_id, versions = ids.len(), "published");
        Ok(ids)
    }

    fn abort(self: Box<Self>) {
        debug!(object = %self.object_id, staged = self.state.staged(), "session aborted");
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        self.store.release(&self.object_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn info(message: &str) -> CommitInfo {
        CommitInfo::new(Utc::now(), message, "relic")
    }

    fn put(session: &mut Box<dyn ObjectSession + '_>, path: &str, bytes: &[u8]) -> StagedFile {
        let mut reader = bytes;
        session.put(path, &mut reader).unwrap()
    }

    #[test]
    fn nothing_is_visible_before_publish() {
        let store = InMemoryArchiveStore::new();
        let mut session = store.open_session("obj").unwrap();
        put(&mut session, "a", b"alpha");
        session.commit(info("v1")).unwrap();
        assert!(!store.exists("obj").unwrap());

        assert_eq!(session.publish().unwrap(), vec!["v1"]);
        assert!(store.exists("obj").unwrap());
        assert_eq!(store.read_file("obj", None, "a").unwrap().unwrap(), b"alpha");
    }

    #[test]
    fn abort_discards_all_versions() {
        let store = InMemoryArchiveStore::new();
        let mut session = store.open_session("obj").unwrap();
        put(&mut session, "a", b"alpha");
        session.commit(info("one")).unwrap();
        put(&mut session, "b", b"beta");
        session.commit(info("two")).unwrap();
        session.abort();

        assert!(!store.exists("obj").unwrap());
        assert_eq!(store.blob_count(), 0);
        // The object is free again.
        assert!(store.open_session("obj").is_ok());
    }

    #[test]
    fn versions_accumulate_and_deduplicate() {
        let store = InMemoryArchiveStore::new();
        let mut session = store.open_session("obj").unwrap();
        assert!(!put(&mut session, "a", b"same").deduplicated);
        assert_eq!(session.commit(info("one")).unwrap(), "v1");
        assert!(put(&mut session, "b", b"same").deduplicated);
        assert_eq!(session.commit(info("two")).unwrap(), "v2");
        session.publish().unwrap();
        assert_eq!(store.blob_count(), 1);

        let mut session = store.open_session("obj").unwrap();
        assert!(session.contains("a"));
        assert!(session.remove("a").unwrap());
        assert_eq!(session.commit(info("three")).unwrap(), "v3");
        session.publish().unwrap();

        let versions = store.versions("obj").unwrap();
        assert_eq!(versions.len(), 3);
        assert_eq!(versions[2].message.as_deref(), Some("three"));
        assert!(!versions[2].contains("a"));
        assert_eq!(store.read_file("obj", Some("v1"), "a").unwrap().unwrap(), b"same");
        assert!(store.read_file("obj", None, "a").unwrap().is_none());
        assert!(matches!(
            store.read_file("obj", Some("v9"), "a"),
            Err(StoreError::UnknownVersion { .. })
        ));
    }

    #[test]
    fn one_session_per_object() {
        let store = InMemoryArchiveStore::new();
        let session = store.open_session("obj").unwrap();
        assert!(matches!(store.open_session("obj"), Err(StoreError::Busy(_))));
        assert!(store.open_session("other").is_ok());
        drop(session);
        assert!(store.open_session("obj").is_ok());
    }

    #[test]
    fn invalid_paths_are_rejected() {
        let store = InMemoryArchiveStore::new();
        let mut session = store.open_session("obj").unwrap();
        let mut reader: &[u8] = b"x";
        assert!(matches!(
            session.put("../escape", &mut reader),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn missing_object_reads() {
        let store = InMemoryArchiveStore::new();
        assert!(store.versions("nope").unwrap().is_empty());
        assert!(store.head("nope").unwrap().is_none());
        assert!(matches!(
            store.read_file("nope", None, "a"),
            Err(StoreError::NotFound(_))
        ));
    }
}
