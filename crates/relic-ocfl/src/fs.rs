//! OCFL 1.1 storage root on the local file system.
//!
//! Layout:
//!
//! ```text
//! <root>/0=ocfl_1.1
//! <root>/ocfl_layout.json
//! <root>/extensions/0004-hashed-n-tuple-storage-layout/config.json
//! <root>/extensions/relic-staging/            (session scratch space)
//! <root>/3c0/ff4/240/3c0ff4240c.../           (object root)
//!     0=ocfl_object_1.1
//!     inventory.json
//!     inventory.json.sha512
//!     v1/inventory.json
//!     v1/inventory.json.sha512
//!     v1/content/<logical path>
//! ```
//!
//! Publishing a version moves its new content into `vN/content/`, writes
//! `vN/inventory.json`, and then replaces the root `inventory.json` with an
//! atomic rename. Until that rename the version does not exist for readers;
//! leftovers of an interrupted publish are removed when the next session
//! for the object opens.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use relic_crypto::{ContentHasher, DigestAlgorithm, DigestingReader};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::inventory::{version_number, Inventory};
use crate::layout::{
    layout_config, layout_description, object_root_path, LAYOUT_EXTENSION, LAYOUT_FILE,
    OBJECT_NAMASTE, ROOT_NAMASTE,
};
use crate::staging::WorkingState;
use crate::traits::{ArchiveStore, CommitInfo, ObjectSession, ObjectVersion, StagedFile};

const INVENTORY_FILE: &str = "inventory.json";
const STAGING_DIR: &str = "extensions/relic-staging";

/// File-system OCFL storage root.
pub struct FsArchiveStore {
    root: PathBuf,
    algorithm: DigestAlgorithm,
    open: Mutex<HashSet<String>>,
}

impl FsArchiveStore {
    /// Open the storage root at `root`, initializing it if it does not exist
    /// or is an empty directory. New objects use `algorithm`.
    pub fn open_or_init(root: impl AsRef<Path>, algorithm: DigestAlgorithm) -> StoreResult<Self> {
        if !algorithm.is_inventory_algorithm() {
            return Err(StoreError::Unsupported(format!(
                "{algorithm} cannot be used as an inventory digest"
            )));
        }
        let root = root.as_ref().to_path_buf();
        let is_empty = match fs::read_dir(&root) {
            Ok(mut entries) => entries.next().is_none(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if is_empty {
            Self::init_root(&root)?;
        } else {
            Self::check_root(&root)?;
        }

        // Scratch space of sessions that never finished.
        let staging = root.join(STAGING_DIR);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        Ok(Self {
            root,
            algorithm,
            open: Mutex::new(HashSet::new()),
        })
    }

    fn init_root(root: &Path) -> StoreResult<()> {
        fs::create_dir_all(root)?;
        fs::write(root.join(ROOT_NAMASTE.0), ROOT_NAMASTE.1)?;
        fs::write(
            root.join(LAYOUT_FILE),
            serde_json::to_vec_pretty(&layout_description())?,
        )?;
        let extension = root.join("extensions").join(LAYOUT_EXTENSION);
        fs::create_dir_all(&extension)?;
        fs::write(
            extension.join("config.json"),
            serde_json::to_vec_pretty(&layout_config())?,
        )?;
        info!(root = %root.display(), "initialized OCFL storage root");
        Ok(())
    }

    fn check_root(root: &Path) -> StoreResult<()> {
        if !root.join(ROOT_NAMASTE.0).is_file() {
            return Err(StoreError::Corrupt {
                location: root.display().to_string(),
                reason: format!("not an OCFL storage root (missing {})", ROOT_NAMASTE.0),
            });
        }
        let layout: serde_json::Value = match fs::read(root.join(LAYOUT_FILE)) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Unsupported("storage root declares no layout".into()))
            }
            Err(e) => return Err(e.into()),
        };
        match layout.get("extension").and_then(|v| v.as_str()) {
            Some(LAYOUT_EXTENSION) => Ok(()),
            other => Err(StoreError::Unsupported(format!(
                "storage layout {other:?}, expected {LAYOUT_EXTENSION}"
            ))),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of an object's root directory.
    pub fn object_root(&self, object_id: &str) -> PathBuf {
        self.root.join(object_root_path(object_id))
    }

    fn load_inventory(&self, object_id: &str) -> StoreResult<Option<Inventory>> {
        let path = self.object_root(object_id).join(INVENTORY_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let inventory = Inventory::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;
        inventory.validate(object_id)?;
        Ok(Some(inventory))
    }

    fn inventory_algorithm(inventory: &Inventory) -> StoreResult<DigestAlgorithm> {
        inventory
            .digest_algorithm
            .parse::<DigestAlgorithm>()
            .map_err(|e| StoreError::Unsupported(e.to_string()))
    }

    /// Remove what an interrupted publish left behind.
    fn recover(&self, object_id: &str, inventory: Option<&Inventory>) -> StoreResult<()> {
        let object_root = self.object_root(object_id);
        if !object_root.exists() {
            return Ok(());
        }
        let Some(inventory) = inventory else {
            warn!(object = object_id, path = %object_root.display(), "removing object root without inventory");
            fs::remove_dir_all(&object_root)?;
            return Ok(());
        };

        let head = inventory.head_number();
        for entry in fs::read_dir(&object_root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(number) = name.to_str().and_then(version_number) else {
                continue;
            };
            if number > head {
                warn!(object = object_id, version = ?name, "removing unpublished version directory");
                fs::remove_dir_all(entry.path())?;
            }
        }

        let algorithm = Self::inventory_algorithm(inventory)?;
        let sidecar = object_root.join(sidecar_name(algorithm));
        let expected = sidecar_contents(algorithm, &fs::read(object_root.join(INVENTORY_FILE))?);
        if fs::read_to_string(&sidecar).ok().as_deref() != Some(expected.as_str()) {
            warn!(object = object_id, "rewriting inventory sidecar");
            write_atomic(&object_root, &sidecar, expected.as_bytes())?;
        }
        Ok(())
    }

    fn release(&self, object_id: &str) {
        self.open.lock().expect("lock poisoned").remove(object_id);
    }
}

impl std::fmt::Debug for FsArchiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsArchiveStore")
            .field("root", &self.root)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl ArchiveStore for FsArchiveStore {
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
        let opened = (|| {
            let inventory = self.load_inventory(object_id)?;
            self.recover(object_id, inventory.as_ref())?;
            let algorithm = match &inventory {
                Some(inventory) => Self::inventory_algorithm(inventory)?,
                None => self.algorithm,
            };
            let state = match &inventory {
                Some(inventory) => WorkingState::new(inventory.head_state(), inventory.head_number()),
                None => WorkingState::default(),
            };
            let staging = tempfile::Builder::new()
                .prefix("session-")
                .tempdir_in(self.root.join(STAGING_DIR))?;
            Ok::<_, StoreError>(FsSession {
                store: self,
                object_id: object_id.to_string(),
                algorithm,
                inventory,
                state,
                staging,
                staged: HashMap::new(),
                incoming: 0,
            })
        })();
        match opened {
            Ok(session) => Ok(Box::new(session)),
            Err(e) => {
                self.release(object_id);
                Err(e)
            }
        }
    }

    fn exists(&self, object_id: &str) -> StoreResult<bool> {
        Ok(self.load_inventory(object_id)?.is_some())
    }

    fn versions(&self, object_id: &str) -> StoreResult<Vec<ObjectVersion>> {
        Ok(self
            .load_inventory(object_id)?
            .map(|inventory| inventory.summaries())
            .unwrap_or_default())
    }

    fn read_file(
        &self,
        object_id: &str,
        version: Option<&str>,
        path: &str,
    ) -> StoreResult<Option<Vec<u8>>> {
        let inventory = self
            .load_inventory(object_id)?
            .ok_or_else(|| StoreError::NotFound(object_id.to_string()))?;
        let version_id = version.unwrap_or(&inventory.head);
        let state = inventory
            .logical_state(version_id)
            .ok_or_else(|| StoreError::UnknownVersion {
                object: object_id.to_string(),
                version: version_id.to_string(),
            })?;
        let Some(digest) = state.get(path) else {
            return Ok(None);
        };
        let content_path = inventory
            .content_path(digest)
            .ok_or_else(|| StoreError::Corrupt {
                location: object_id.to_string(),
                reason: format!("no manifest entry for {digest}"),
            })?;
        Ok(Some(fs::read(self.object_root(object_id).join(content_path))?))
    }
}

/// Session against an [`FsArchiveStore`].
struct FsSession<'a> {
    store: &'a FsArchiveStore,
    object_id: String,
    algorithm: DigestAlgorithm,
    inventory: Option<Inventory>,
    state: WorkingState,
    staging: TempDir,
    /// New content by digest, not yet in any published version.
    staged: HashMap<String, PathBuf>,
    incoming: u64,
}

impl FsSession<'_> {
    fn is_stored(&self, digest: &str) -> bool {
        self.staged.contains_key(digest)
            || self
                .inventory
                .as_ref()
                .is_some_and(|inventory| inventory.has_digest(digest))
    }

    fn publish_version(
        &mut self,
        object_root: &Path,
        inventory: &mut Inventory,
        info: &CommitInfo,
        state: &std::collections::BTreeMap<String, String>,
    ) -> StoreResult<String> {
        let version_id = inventory.next_version_id();
        let version_dir = object_root.join(&version_id);
        let content_dir = version_dir.join(inventory.content_directory());
        fs::create_dir_all(&version_dir)?;

        for (path, digest) in state {
            if inventory.has_digest(digest) {
                continue;
            }
            let staged = self.staged.remove(digest).ok_or_else(|| StoreError::Corrupt {
                location: format!("{}/{version_id}", self.object_id),
                reason: format!("content for {path} was never staged"),
            })?;
            let target = content_dir.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&staged, &target)?;
            inventory.add_manifest_entry(
                digest,
                format!("{version_id}/{}/{path}", inventory.content_directory()),
            );
        }

        let added = inventory.add_version(info, state)?;
        debug_assert_eq!(added, version_id);
        let json = inventory.to_json()?;
        let sidecar = sidecar_contents(self.algorithm, &json);

        write_atomic(&version_dir, &version_dir.join(INVENTORY_FILE), &json)?;
        write_atomic(&version_dir, &version_dir.join(sidecar_name(self.algorithm)), sidecar.as_bytes())?;
        // Commit point of the version.
        write_atomic(object_root, &object_root.join(INVENTORY_FILE), &json)?;
        write_atomic(object_root, &object_root.join(sidecar_name(self.algorithm)), sidecar.as_bytes())?;
        Ok(version_id)
    }
}

impl ObjectSession for FsSession<'_> {
    fn object_id(&self) -> &str {
        &self.object_id
    }

    fn put(&mut self, path: &str, content: &mut dyn Read) -> StoreResult<StagedFile> {
        self.state.check_path(path)?;
        let incoming = self.staging.path().join(format!("incoming-{}", self.incoming));
        self.incoming += 1;

        let mut reader = DigestingReader::new(content, &[self.algorithm]);
        {
            let mut out = BufWriter::new(File::create(&incoming)?);
            io::copy(&mut reader, &mut out)?;
            out.flush()?;
        }
        let summary = reader.finish();
        let digest = summary
            .get(self.algorithm)
            .map(str::to_string)
            .unwrap_or_else(|| ContentHasher::new(self.algorithm).finalize_hex());

        let deduplicated = self.is_stored(&digest);
        if deduplicated {
            fs::remove_file(&incoming)?;
        } else {
            let staged = self.staging.path().join(&digest);
            fs::rename(&incoming, &staged)?;
            self.staged.insert(digest.clone(), staged);
        }
        self.state.put(path, digest.clone())?;
        Ok(StagedFile {
            digest,
            size: summary.size,
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
        let versions = std::mem::take(&mut self.state).into_versions(&self.object_id);
        if versions.is_empty() {
            return Ok(Vec::new());
        }

        let object_root = self.store.object_root(&self.object_id);
        let mut inventory = match self.inventory.take() {
            Some(inventory) => inventory,
            None => {
                fs::create_dir_all(&object_root)?;
                fs::write(object_root.join(OBJECT_NAMASTE.0), OBJECT_NAMASTE.1)?;
                Inventory::new(self.object_id.clone(), self.algorithm.ocfl_name())
            }
        };

        let mut ids = Vec::with_capacity(versions.len());
        for version in &versions {
            let id = self.publish_version(&object_root, &mut inventory, &version.info, &version.state)?;
            debug!(object = %self.object_id, version = %id, files = version.state.len(), "published version");
            ids.push(id);
        }
        Ok(ids)
    }

    fn abort(self: Box<Self>) {
        debug!(object = %self.object_id, staged = self.state.staged(), "session aborted");
    }
}

impl Drop for FsSession<'_> {
    fn drop(&mut self) {
        self.store.release(&self.object_id);
    }
}

fn sidecar_name(algorithm: DigestAlgorithm) -> String {
    format!("{INVENTORY_FILE}.{}", algorithm.ocfl_name())
}

fn sidecar_contents(algorithm: DigestAlgorithm, inventory_json: &[u8]) -> String {
    format!(
        "{}  {INVENTORY_FILE}\n",
        ContentHasher::digest_hex(algorithm, inventory_json)
    )
}

/// Write `bytes` to `target` through a synced temporary file in `dir`.
fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn info(message: &str) -> CommitInfo {
        CommitInfo::new(Utc::now(), message, "relic").with_user_address("mailto:relic@example.org")
    }

    fn put(session: &mut Box<dyn ObjectSession + '_>, path: &str, bytes: &[u8]) -> StagedFile {
        let mut reader = bytes;
        session.put(path, &mut reader).unwrap()
    }

    fn content_files(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.components().any(|c| c.as_os_str() == "content") {
                    files.push(path);
                }
            }
        }
        files
    }

    // ---------------------------------------------------------------
    // Storage root
    // ---------------------------------------------------------------

    #[test]
    fn initializes_storage_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ocfl");
        FsArchiveStore::open_or_init(&root, DigestAlgorithm::Sha512).unwrap();
        assert_eq!(fs::read_to_string(root.join("0=ocfl_1.1")).unwrap(), "ocfl_1.1\n");
        assert!(root.join(LAYOUT_FILE).is_file());
        assert!(root
            .join("extensions")
            .join(LAYOUT_EXTENSION)
            .join("config.json")
            .is_file());

        // Reopening an initialized root works.
        FsArchiveStore::open_or_init(&root, DigestAlgorithm::Sha512).unwrap();
    }

    #[test]
    fn refuses_foreign_directories_and_algorithms() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("unrelated.txt"), b"x").unwrap();
        assert!(matches!(
            FsArchiveStore::open_or_init(dir.path(), DigestAlgorithm::Sha512),
            Err(StoreError::Corrupt { .. })
        ));

        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(
            FsArchiveStore::open_or_init(empty.path(), DigestAlgorithm::Md5),
            Err(StoreError::Unsupported(_))
        ));
    }

    // ---------------------------------------------------------------
    // Sessions
    // ---------------------------------------------------------------

    #[test]
    fn publishes_versions_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::open_or_init(dir.path(), DigestAlgorithm::Sha512).unwrap();

        let mut session = store.open_session("info:fedora/demo:1").unwrap();
        put(&mut session, ".fcrepo/fcr-root.json", b"{}");
        put(&mut session, "DS1", b"first");
        assert_eq!(session.commit(info("one")).unwrap(), "v1");
        put(&mut session, "DS1", b"second");
        assert_eq!(session.commit(info("two")).unwrap(), "v2");
        assert!(!store.exists("info:fedora/demo:1").unwrap());
        assert_eq!(session.publish().unwrap(), vec!["v1", "v2"]);

        let object_root = store.object_root("info:fedora/demo:1");
        assert_eq!(
            fs::read_to_string(object_root.join("0=ocfl_object_1.1")).unwrap(),
            "ocfl_object_1.1\n"
        );
        assert!(object_root.join("v1/content/DS1").is_file());
        assert!(object_root.join("v2/content/DS1").is_file());
        assert!(object_root.join("v1/content/.fcrepo/fcr-root.json").is_file());
        assert!(object_root.join("v2/inventory.json").is_file());

        let sidecar = fs::read_to_string(object_root.join("inventory.json.sha512")).unwrap();
        let inventory_bytes = fs::read(object_root.join("inventory.json")).unwrap();
        assert_eq!(
            sidecar,
            format!(
                "{}  inventory.json\n",
                ContentHasher::digest_hex(DigestAlgorithm::Sha512, &inventory_bytes)
            )
        );

        assert_eq!(
            store.read_file("info:fedora/demo:1", None, "DS1").unwrap().unwrap(),
            b"second"
        );
        assert_eq!(
            store.read_file("info:fedora/demo:1", Some("v1"), "DS1").unwrap().unwrap(),
            b"first"
        );
        let versions = store.versions("info:fedora/demo:1").unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[1].message.as_deref(), Some("two"));
        assert_eq!(versions[1].user_name.as_deref(), Some("relic"));
    }

    #[test]
    fn identical_content_is_stored_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::open_or_init(dir.path(), DigestAlgorithm::Sha256).unwrap();

        let mut session = store.open_session("obj").unwrap();
        assert!(!put(&mut session, "a", b"same bytes").deduplicated);
        assert!(put(&mut session, "b", b"same bytes").deduplicated);
        session.commit(info("one")).unwrap();
        session.publish().unwrap();

        let mut session = store.open_session("obj").unwrap();
        assert!(put(&mut session, "c", b"same bytes").deduplicated);
        session.commit(info("two")).unwrap();
        session.publish().unwrap();

        assert_eq!(content_files(&store.object_root("obj")).len(), 1);
        assert_eq!(store.read_file("obj", None, "c").unwrap().unwrap(), b"same bytes");
        assert!(store
            .object_root("obj")
            .join("inventory.json.sha256")
            .is_file());
    }

    #[test]
    fn aborted_session_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::open_or_init(dir.path(), DigestAlgorithm::Sha512).unwrap();

        let mut session = store.open_session("obj").unwrap();
        put(&mut session, "a", b"alpha");
        session.commit(info("one")).unwrap();
        session.abort();

        assert!(!store.exists("obj").unwrap());
        assert!(!store.object_root("obj").exists());
        let staging: Vec<_> = fs::read_dir(dir.path().join(STAGING_DIR)).unwrap().collect();
        assert!(staging.is_empty());
    }

    #[test]
    fn removals_are_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::open_or_init(dir.path(), DigestAlgorithm::Sha512).unwrap();

        let mut session = store.open_session("obj").unwrap();
        put(&mut session, "old-name.txt", b"content");
        session.commit(info("one")).unwrap();
        assert!(session.remove("old-name.txt").unwrap());
        put(&mut session, "new-name.txt", b"content");
        session.commit(info("two")).unwrap();
        session.publish().unwrap();

        let head = store.head("obj").unwrap().unwrap();
        assert_eq!(head.paths().collect::<Vec<_>>(), vec!["new-name.txt"]);
        assert!(store.read_file("obj", None, "old-name.txt").unwrap().is_none());
    }

    #[test]
    fn interrupted_publish_is_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::open_or_init(dir.path(), DigestAlgorithm::Sha512).unwrap();
        let mut session = store.open_session("obj").unwrap();
        put(&mut session, "a", b"alpha");
        session.commit(info("one")).unwrap();
        session.publish().unwrap();

        // A version directory that never got its inventory renamed into place.
        let object_root = store.object_root("obj");
        fs::create_dir_all(object_root.join("v2/content")).unwrap();
        fs::write(object_root.join("v2/content/a"), b"partial").unwrap();
        fs::write(object_root.join("inventory.json.sha512"), b"stale").unwrap();

        let mut session = store.open_session("obj").unwrap();
        assert!(!object_root.join("v2").exists());
        put(&mut session, "a", b"beta");
        assert_eq!(session.commit(info("two")).unwrap(), "v2");
        session.publish().unwrap();
        assert_eq!(store.read_file("obj", None, "a").unwrap().unwrap(), b"beta");
        assert_eq!(store.read_file("obj", Some("v1"), "a").unwrap().unwrap(), b"alpha");
    }

    #[test]
    fn object_root_without_inventory_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::open_or_init(dir.path(), DigestAlgorithm::Sha512).unwrap();
        let object_root = store.object_root("obj");
        fs::create_dir_all(object_root.join("v1/content")).unwrap();
        fs::write(object_root.join("0=ocfl_object_1.1"), OBJECT_NAMASTE.1).unwrap();

        assert!(!store.exists("obj").unwrap());
        let mut session = store.open_session("obj").unwrap();
        assert!(!object_root.exists());
        put(&mut session, "a", b"fresh");
        session.commit(info("one")).unwrap();
        assert_eq!(session.publish().unwrap(), vec!["v1"]);
    }

    #[test]
    fn sessions_are_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::open_or_init(dir.path(), DigestAlgorithm::Sha512).unwrap();
        let session = store.open_session("obj").unwrap();
        assert!(matches!(store.open_session("obj"), Err(StoreError::Busy(_))));
        session.abort();
        assert!(store.open_session("obj").is_ok());
    }

    #[test]
    fn publishing_nothing_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArchiveStore::open_or_init(dir.path(), DigestAlgorithm::Sha512).unwrap();
        let session = store.open_session("obj").unwrap();
        assert!(session.publish().unwrap().is_empty());
        assert!(!store.object_root("obj").exists());
    }
}
