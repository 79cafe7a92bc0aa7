use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{MigrationError, MigrationResult};

/// A set of serialized objects to migrate.
///
/// `names` must be stable across runs so that restarted migrations visit
/// objects in the same order.
pub trait ObjectSource: Send + Sync + fmt::Debug {
    /// Names of every document, in processing order.
    fn names(&self) -> Vec<String>;

    fn open(&self, name: &str) -> io::Result<Box<dyn BufRead + Send + '_>>;
}

/// FOXML documents under a directory, walked recursively.
///
/// Every regular file not starting with `.` is a document. Names are paths
/// relative to the root, sorted.
pub struct DirectoryObjectSource {
    root: PathBuf,
    names: Vec<String>,
}

impl DirectoryObjectSource {
    pub fn scan(root: impl AsRef<Path>) -> MigrationResult<Self> {
        let root = root.as_ref().to_path_buf();
        let mut names = Vec::new();
        let walker = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
        for entry in walker {
            let entry = entry.map_err(|e| {
                MigrationError::Io(e.into_io_error().unwrap_or_else(|| {
                    io::Error::new(io::ErrorKind::Other, "filesystem loop in source directory")
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            names.push(relative.to_string_lossy().replace('\\', "/"));
        }
        names.sort();
        debug!(root = %root.display(), documents = names.len(), "scanned source directory");
        Ok(Self { root, names })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Debug for DirectoryObjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryObjectSource")
            .field("root", &self.root)
            .field("documents", &self.names.len())
            .finish()
    }
}

impl ObjectSource for DirectoryObjectSource {
    fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn open(&self, name: &str) -> io::Result<Box<dyn BufRead + Send + '_>> {
        let file = File::open(self.root.join(name))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Documents held in memory, ordered by name.
#[derive(Debug, Default)]
pub struct InMemoryObjectSource {
    documents: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryObjectSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, document: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(name.into(), document.into());
    }
}

impl ObjectSource for InMemoryObjectSource {
    fn names(&self) -> Vec<String> {
        self.documents
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    fn open(&self, name: &str) -> io::Result<Box<dyn BufRead + Send + '_>> {
        let documents = self.documents.read().expect("lock poisoned");
        match documents.get(name) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no document named {name}"),
            )),
        }
    }
}
