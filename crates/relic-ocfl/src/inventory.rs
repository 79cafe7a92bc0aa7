use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::traits::{CommitInfo, ObjectVersion};

/// Inventory type for OCFL 1.1.
pub const INVENTORY_TYPE: &str = "https://ocfl.io/1.1/spec/#inventory";
/// Directory holding a version's content files.
pub const CONTENT_DIRECTORY: &str = "content";

/// An OCFL object inventory.
///
/// `manifest` maps each digest to the content paths (relative to the object
/// root) holding those bytes. Each version's `state` maps digests to the
/// logical paths that had that content in the version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub digest_algorithm: String,
    pub head: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_directory: Option<String>,
    pub manifest: BTreeMap<String, Vec<String>>,
    pub versions: BTreeMap<String, InventoryVersion>,
}

/// One version block of an inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryVersion {
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub state: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Parse `v12` into `12`.
pub fn version_number(id: &str) -> Option<u32> {
    let digits = id.strip_prefix('v')?;
    if digits.is_empty() || digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

impl Inventory {
    /// An inventory with no versions yet.
    pub fn new(id: impl Into<String>, digest_algorithm: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: INVENTORY_TYPE.to_string(),
            digest_algorithm: digest_algorithm.into(),
            head: String::new(),
            content_directory: Some(CONTENT_DIRECTORY.to_string()),
            manifest: BTreeMap::new(),
            versions: BTreeMap::new(),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> StoreResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> StoreResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Number of the head version, 0 when there are no versions.
    pub fn head_number(&self) -> u32 {
        version_number(&self.head).unwrap_or(0)
    }

    pub fn next_version_id(&self) -> String {
        format!("v{}", self.head_number() + 1)
    }

    /// Version ids in numeric order.
    pub fn version_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.versions.keys().map(String::as_str).collect();
        ids.sort_by_key(|id| version_number(id).unwrap_or(0));
        ids
    }

    pub fn content_directory(&self) -> &str {
        self.content_directory.as_deref().unwrap_or(CONTENT_DIRECTORY)
    }

    pub fn has_digest(&self, digest: &str) -> bool {
        self.manifest.contains_key(digest)
    }

    /// First content path storing `digest`.
    pub fn content_path(&self, digest: &str) -> Option<&str> {
        self.manifest
            .get(digest)
            .and_then(|paths| paths.first())
            .map(String::as_str)
    }

    pub fn add_manifest_entry(&mut self, digest: &str, content_path: String) {
        self.manifest
            .entry(digest.to_string())
            .or_default()
            .push(content_path);
    }

    /// Logical path to digest for one version.
    pub fn logical_state(&self, version_id: &str) -> Option<BTreeMap<String, String>> {
        let version = self.versions.get(version_id)?;
        Some(
            version
                .state
                .iter()
                .flat_map(|(digest, paths)| {
                    paths.iter().map(move |path| (path.clone(), digest.clone()))
                })
                .collect(),
        )
    }

    pub fn head_state(&self) -> BTreeMap<String, String> {
        self.logical_state(&self.head).unwrap_or_default()
    }

    /// Append a version with the given logical state. Every digest must
    /// already be in the manifest.
    pub fn add_version(
        &mut self,
        info: &CommitInfo,
        state: &BTreeMap<String, String>,
    ) -> StoreResult<String> {
        let id = self.next_version_id();
        let mut by_digest: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (path, digest) in state {
            if !self.has_digest(digest) {
                return Err(StoreError::Corrupt {
                    location: format!("{}/{id}", self.id),
                    reason: format!("state entry {path} refers to unknown digest {digest}"),
                });
            }
            by_digest.entry(digest.clone()).or_default().push(path.clone());
        }
        self.versions.insert(
            id.clone(),
            InventoryVersion {
                created: info.created_string(),
                message: Some(info.message.clone()),
                user: Some(User {
                    name: info.user_name.clone(),
                    address: info.user_address.clone(),
                }),
                state: by_digest,
            },
        );
        self.head = id.clone();
        Ok(id)
    }

    /// Structural checks applied to inventories read back from storage.
    pub fn validate(&self, expected_id: &str) -> StoreResult<()> {
        let corrupt = |reason: String| StoreError::Corrupt {
            location: expected_id.to_string(),
            reason,
        };
        if self.id != expected_id {
            return Err(corrupt(format!("inventory id is {}", self.id)));
        }
        if self.kind != INVENTORY_TYPE {
            return Err(corrupt(format!("unsupported inventory type {}", self.kind)));
        }
        if !self.versions.contains_key(&self.head) {
            return Err(corrupt(format!("head {} is not a listed version", self.head)));
        }
        let head = self.head_number();
        for n in 1..=head {
            if !self.versions.contains_key(&format!("v{n}")) {
                return Err(corrupt(format!("version sequence has a gap at v{n}")));
            }
        }
        for (id, version) in &self.versions {
            if version_number(id).map_or(true, |n| n > head) {
                return Err(corrupt(format!("unexpected version id {id}")));
            }
            if let Some(digest) = version.state.keys().find(|d| !self.has_digest(d)) {
                return Err(corrupt(format!("{id} refers to unknown digest {digest}")));
            }
        }
        Ok(())
    }

    /// Public summary of one version.
    pub fn summary(&self, version_id: &str) -> Option<ObjectVersion> {
        let version = self.versions.get(version_id)?;
        Some(ObjectVersion {
            id: version_id.to_string(),
            created: version.created.clone(),
            message: version.message.clone(),
            user_name: version.user.as_ref().map(|u| u.name.clone()),
            user_address: version.user.as_ref().and_then(|u| u.address.clone()),
            state: self.logical_state(version_id).unwrap_or_default(),
        })
    }

    /// Summaries of all versions, oldest first.
    pub fn summaries(&self) -> Vec<ObjectVersion> {
        self.version_ids()
            .into_iter()
            .filter_map(|id| self.summary(id))
            .collect()
    }
}
