use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::layout::validate_logical_path;
use crate::traits::CommitInfo;

/// A committed, unpublished version.
#[derive(Clone, Debug)]
pub(crate) struct StagedVersion {
    pub info: CommitInfo,
    /// Logical path to digest.
    pub state: BTreeMap<String, String>,
}

/// Logical state of an object inside one session.
///
/// Starts from the published head and accumulates committed versions.
#[derive(Debug, Default)]
pub(crate) struct WorkingState {
    current: BTreeMap<String, String>,
    versions: Vec<StagedVersion>,
    base_head: u32,
    dirty: bool,
}

impl WorkingState {
    pub(crate) fn new(head_state: BTreeMap<String, String>, base_head: u32) -> Self {
        Self {
            current: head_state,
            versions: Vec::new(),
            base_head,
            dirty: false,
        }
    }

    /// Check a path before any bytes are staged for it.
    pub(crate) fn check_path(&self, path: &str) -> StoreResult<()> {
        validate_logical_path(path)?;
        let as_dir = format!("{path}/");
        let conflict = self.current.keys().find(|existing| {
            existing.starts_with(&as_dir) || path.starts_with(&format!("{existing}/"))
        });
        match conflict {
            Some(existing) => Err(StoreError::InvalidPath {
                path: path.to_string(),
                reason: format!("conflicts with existing path {existing}"),
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn put(&mut self, path: &str, digest: String) -> StoreResult<()> {
        self.check_path(path)?;
        self.current.insert(path.to_string(), digest);
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn remove(&mut self, path: &str) -> bool {
        let removed = self.current.remove(path).is_some();
        self.dirty |= removed;
        removed
    }

    pub(crate) fn contains(&self, path: &str) -> bool {
        self.current.contains_key(path)
    }

    /// Snapshot the working state as the next version.
    pub(crate) fn commit(&mut self, info: CommitInfo) -> String {
        self.versions.push(StagedVersion {
            info,
            state: self.current.clone(),
        });
        self.dirty = false;
        format!("v{}", self.base_head as usize + self.versions.len())
    }

    pub(crate) fn staged(&self) -> usize {
        self.versions.len()
    }

    /// Committed versions, oldest first. Uncommitted changes are dropped.
    pub(crate) fn into_versions(self, object_id: &str) -> Vec<StagedVersion> {
        if self.dirty {
            warn!(object = object_id, "discarding uncommitted changes at publish");
        }
        self.versions
    }
}
