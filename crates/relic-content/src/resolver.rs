use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::accessor::{ContentAccessor, FileContent, MemoryContent};
use crate::error::{ContentError, ContentResult};

/// Maps legacy internal content ids (`demo:1+DS1+DS1.0`) to content.
///
/// Implementations fail with [`ContentError::Unresolvable`] when zero or more
/// than one stored resource matches the id.
pub trait InternalIdResolver: Send + Sync + fmt::Debug {
    fn resolve(&self, id: &str) -> ContentResult<Box<dyn ContentAccessor>>;
}

/// Resolver for migrations without managed content; every lookup fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullIdResolver;

impl InternalIdResolver for NullIdResolver {
    fn resolve(&self, id: &str) -> ContentResult<Box<dyn ContentAccessor>> {
        Err(ContentError::Unresolvable {
            id: id.to_string(),
            matches: 0,
        })
    }
}

/// In-memory resolver for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryIdResolver {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryIdResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content under an internal id, replacing any previous entry.
    pub fn insert(&self, id: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(id.into(), content.into());
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }
}

impl InternalIdResolver for InMemoryIdResolver {
    fn resolve(&self, id: &str) -> ContentResult<Box<dyn ContentAccessor>> {
        let entries = self.entries.read().expect("lock poisoned");
        match entries.get(id) {
            Some(bytes) => Ok(Box::new(MemoryContent::new(bytes.clone()))),
            None => Err(ContentError::Unresolvable {
                id: id.to_string(),
                matches: 0,
            }),
        }
    }
}

/// Resolver over a legacy datastream store directory.
///
/// The store keeps one file per datastream version, named by the
/// percent-encoded version URI (`info%3Afedora%2Fdemo%3A1%2FDS1%2FDS1.0`),
/// possibly nested in hashed subdirectories. The directory is indexed once
/// when the resolver is built.
pub struct DirectoryIdResolver {
    root: PathBuf,
    index: HashMap<String, Vec<PathBuf>>,
}

impl DirectoryIdResolver {
    /// Walk `root` and index every regular file by its internal id.
    pub fn build(root: impl AsRef<Path>) -> ContentResult<Self> {
        let root = root.as_ref().to_path_buf();
        let mut index: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for entry in WalkDir::new(&root).follow_links(true) {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => ContentError::Io(io),
                None => ContentError::Unavailable {
                    location: root.display().to_string(),
                    reason: "filesystem loop in datastream store".into(),
                },
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                warn!(path = %entry.path().display(), "skipping non-UTF-8 file name");
                continue;
            };
            index
                .entry(internal_id_from_file_name(name))
                .or_default()
                .push(entry.into_path());
        }
        debug!(root = %root.display(), entries = index.len(), "indexed datastream store");
        Ok(Self { root, index })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of distinct internal ids in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl fmt::Debug for DirectoryIdResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryIdResolver")
            .field("root", &self.root)
            .field("entries", &self.index.len())
            .finish()
    }
}

impl InternalIdResolver for DirectoryIdResolver {
    fn resolve(&self, id: &str) -> ContentResult<Box<dyn ContentAccessor>> {
        match self.index.get(id).map(Vec::as_slice) {
            Some([path]) => Ok(Box::new(FileContent::new(path.clone()))),
            Some(paths) => Err(ContentError::Unresolvable {
                id: id.to_string(),
                matches: paths.len(),
            }),
            None => Err(ContentError::Unresolvable {
                id: id.to_string(),
                matches: 0,
            }),
        }
    }
}

/// Convert a datastream store file name to the internal id used in FOXML.
///
/// `info%3Afedora%2Fdemo%3A1%2FDS1%2FDS1.0` becomes `demo:1+DS1+DS1.0`.
/// Names already in internal-id form pass through unchanged.
pub fn internal_id_from_file_name(name: &str) -> String {
    let decoded = urlencoding::decode_binary(name.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);
    let bare = decoded.strip_prefix("info:fedora/").unwrap_or(&decoded);
    bare.replace('/', "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_all(accessor: Box<dyn ContentAccessor>) -> Vec<u8> {
        let mut out = Vec::new();
        accessor.open().unwrap().read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn file_names_map_to_internal_ids() {
        assert_eq!(
            internal_id_from_file_name("info%3Afedora%2Fdemo%3A1%2FDS1%2FDS1.0"),
            "demo:1+DS1+DS1.0"
        );
        assert_eq!(internal_id_from_file_name("demo:1+DS1+DS1.0"), "demo:1+DS1+DS1.0");
        assert_eq!(internal_id_from_file_name("bad%zzname"), "bad%zzname");
        assert_eq!(internal_id_from_file_name("trailing%4"), "trailing%4");
        assert_eq!(
            internal_id_from_file_name("info%3afedora%2fdemo%3A2%2FDS1%2FDS1.%30"),
            "demo:2+DS1+DS1.0"
        );
    }

    #[test]
    fn null_resolver_never_resolves() {
        let err = NullIdResolver.resolve("demo:1+DS1+DS1.0").unwrap_err();
        assert!(matches!(err, ContentError::Unresolvable { matches: 0, .. }));
    }

    #[test]
    fn in_memory_resolver() {
        let resolver = InMemoryIdResolver::new();
        assert!(resolver.is_empty());
        resolver.insert("demo:1+DS1+DS1.0", b"managed".to_vec());
        assert_eq!(resolver.len(), 1);
        assert_eq!(read_all(resolver.resolve("demo:1+DS1+DS1.0").unwrap()), b"managed");
        assert!(resolver.resolve("demo:1+DS1+DS1.1").is_err());
    }

    #[test]
    fn directory_resolver_indexes_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2f").join("a1");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            nested.join("info%3Afedora%2Fdemo%3A1%2FDS1%2FDS1.0"),
            b"version zero",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("info%3Afedora%2Fdemo%3A1%2FDS1%2FDS1.1"),
            b"version one",
        )
        .unwrap();

        let resolver = DirectoryIdResolver::build(dir.path()).unwrap();
        assert_eq!(resolver.len(), 2);
        assert_eq!(
            read_all(resolver.resolve("demo:1+DS1+DS1.0").unwrap()),
            b"version zero"
        );
        assert_eq!(
            read_all(resolver.resolve("demo:1+DS1+DS1.1").unwrap()),
            b"version one"
        );
    }

    #[test]
    fn directory_resolver_rejects_missing_and_ambiguous_ids() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("demo:1+DS1+DS1.0"), b"one").unwrap();
        std::fs::write(b.join("info%3Afedora%2Fdemo%3A1%2FDS1%2FDS1.0"), b"two").unwrap();

        let resolver = DirectoryIdResolver::build(dir.path()).unwrap();
        let err = resolver.resolve("demo:1+DS1+DS1.0").unwrap_err();
        assert!(matches!(err, ContentError::Unresolvable { matches: 2, .. }));

        let err = resolver.resolve("demo:1+DS2+DS2.0").unwrap_err();
        assert!(matches!(err, ContentError::Unresolvable { matches: 0, .. }));
    }
}
