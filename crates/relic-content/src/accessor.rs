use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ContentError, ContentResult};
use crate::fetch::UrlFetcher;

/// Lazy access to a datastream's bytes.
///
/// Implementations must not touch the backing resource until [`open`] is
/// called. Missing resources are reported as [`ContentError::Unavailable`],
/// distinguishable from transport and I/O failures.
///
/// [`open`]: ContentAccessor::open
pub trait ContentAccessor: Send + Sync + fmt::Debug {
    /// Open the content for reading.
    fn open(&self) -> ContentResult<Box<dyn Read + Send + '_>>;

    /// Short human-readable description of where the bytes live.
    fn describe(&self) -> String;
}

/// Content held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryContent {
    bytes: Vec<u8>,
}

impl MemoryContent {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for MemoryContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryContent")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ContentAccessor for MemoryContent {
    fn open(&self) -> ContentResult<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.bytes.as_slice())))
    }

    fn describe(&self) -> String {
        format!("memory ({} bytes)", self.bytes.len())
    }
}

/// Content backed by a file on disk.
///
/// A temporary file is owned by the decoder that created it and disappears
/// when that decoder is dropped; opening it afterwards yields
/// [`ContentError::Unavailable`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileContent {
    path: PathBuf,
    temporary: bool,
}

impl FileContent {
    /// A persistent file, re-openable for as long as it exists.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temporary: false,
        }
    }

    /// A decoder-owned temporary file.
    pub fn temporary(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temporary: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }
}

impl ContentAccessor for FileContent {
    fn open(&self) -> ContentResult<Box<dyn Read + Send + '_>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ContentError::Unavailable {
                location: self.path.display().to_string(),
                reason: if self.temporary {
                    "temporary content was released".into()
                } else {
                    "file not found".into()
                },
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Content behind a URL, fetched on every `open()`.
#[derive(Clone, Debug)]
pub struct UrlContent {
    url: String,
    fetcher: Arc<dyn UrlFetcher>,
}

impl UrlContent {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn UrlFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ContentAccessor for UrlContent {
    fn open(&self) -> ContentResult<Box<dyn Read + Send + '_>> {
        self.fetcher.fetch(&self.url)
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}
