use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{FoxmlError, FoxmlResult};

/// Standard alphabet; legacy exports are inconsistent about trailing padding.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encoded bytes buffered before a decode pass.
const FLUSH_THRESHOLD: usize = 64 * 1024;

/// Incremental base64 decoder writing to `out`.
///
/// Character data arrives in arbitrary slices; whitespace is dropped and
/// only whole 4-character groups are decoded until [`finish`](Self::finish).
pub(crate) struct Base64Sink<W: Write> {
    out: W,
    pending: Vec<u8>,
    written: u64,
}

impl<W: Write> Base64Sink<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            pending: Vec::new(),
            written: 0,
        }
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) -> FoxmlResult<()> {
        self.pending
            .extend(chunk.iter().copied().filter(|b| !b.is_ascii_whitespace()));
        if self.pending.len() >= FLUSH_THRESHOLD {
            let whole = self.pending.len() / 4 * 4;
            self.decode_prefix(whole)?;
        }
        Ok(())
    }

    /// Decode whatever is left and flush. Returns the decoded length.
    pub(crate) fn finish(mut self) -> FoxmlResult<u64> {
        let remaining = self.pending.len();
        self.decode_prefix(remaining)?;
        self.out.flush()?;
        Ok(self.written)
    }

    fn decode_prefix(&mut self, len: usize) -> FoxmlResult<()> {
        if len == 0 {
            return Ok(());
        }
        let decoded = ENGINE
            .decode(&self.pending[..len])
            .map_err(|e| FoxmlError::Base64(e.to_string()))?;
        self.out.write_all(&decoded)?;
        self.written += decoded.len() as u64;
        self.pending.drain(..len);
        Ok(())
    }
}

/// Decoder-owned directory for decoded binary content.
///
/// The directory is created on first use and removed by
/// [`release`](Self::release) or when the owner is dropped.
#[derive(Debug)]
pub(crate) struct ScratchSpace {
    parent: Option<PathBuf>,
    dir: Option<TempDir>,
    next: u64,
}

impl ScratchSpace {
    pub(crate) fn new(parent: Option<PathBuf>) -> Self {
        Self {
            parent,
            dir: None,
            next: 0,
        }
    }

    /// Create a new empty file and return its path.
    pub(crate) fn create_file(&mut self) -> io::Result<(PathBuf, BufWriter<File>)> {
        let dir = match self.dir.take() {
            Some(dir) => dir,
            None => self.create_dir()?,
        };
        let path = dir.path().join(format!("content-{:05}.bin", self.next));
        self.dir = Some(dir);
        self.next += 1;
        let file = File::create(&path)?;
        Ok((path, BufWriter::new(file)))
    }

    fn create_dir(&self) -> io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("relic-foxml-");
        let dir = match &self.parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        debug!(path = %dir.path().display(), "created scratch directory");
        Ok(dir)
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }

    /// Remove every file created so far.
    pub(crate) fn release(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(path = %path.display(), error = %e, "failed to remove scratch directory");
            }
        }
    }
}
