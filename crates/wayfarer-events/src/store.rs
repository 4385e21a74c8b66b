//! Key-value blob persistence behind the event log.
//!
//! The log is persisted as a single JSON text blob under one key. A
//! [`BlobStore`] only needs to read and replace whole blobs; it never sees
//! individual events.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;

/// Whole-blob storage keyed by string.
pub trait BlobStore {
    /// Read the blob stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    fn read_blob(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the blob stored under `key`.
    ///
    /// A failed write must leave any previously stored blob intact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the blob cannot be written.
    fn write_blob(&mut self, key: &str, blob: &str) -> Result<(), StoreError>;
}

// -----------------------------------------------------------------------------
// In-memory store
// -----------------------------------------------------------------------------

/// In-memory store with an optional byte quota per blob.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBlobStore {
    /// Create an empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects blobs longer than `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            blobs: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Current blob under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }

    /// Store a blob directly, bypassing the quota.
    pub fn insert(&mut self, key: impl Into<String>, blob: impl Into<String>) {
        self.blobs.insert(key.into(), blob.into());
    }
}

impl BlobStore for MemoryBlobStore {
    fn read_blob(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write_blob(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota.filter(|&quota| blob.len() > quota) {
            return Err(StoreError::QuotaExceeded {
                key: key.to_owned(),
                needed: blob.len(),
                quota,
            });
        }
        self.blobs.insert(key.to_owned(), blob.to_owned());
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// File store
// -----------------------------------------------------------------------------

/// Directory-backed store writing one `<key>.json` file per blob.
///
/// Writes go to a sibling temporary file that is synced to disk and then
/// renamed over the target, so a failed write never truncates the previous
/// blob.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the blobs.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] unless the key is non-empty, does
    /// not start with a dot, and contains only ASCII letters, digits, `.`,
    /// `_`, or `-`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn read_blob(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_blob(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = write_synced(&tmp, blob).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(path = %path.display(), bytes = blob.len(), "Wrote blob");
        Ok(())
    }
}

/// Write `blob` to `path` and flush it to disk before returning.
fn write_synced(path: &Path, blob: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(blob.as_bytes())?;
    file.sync_all()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let mut store = MemoryBlobStore::new();
        assert_eq!(store.read_blob("k").unwrap(), None);
        store.write_blob("k", "[]").unwrap();
        assert_eq!(store.read_blob("k").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn memory_quota_keeps_previous_blob() {
        let mut store = MemoryBlobStore::with_quota(4);
        store.write_blob("k", "[1]").unwrap();
        let err = store.write_blob("k", "[1,2,3]").unwrap_err();
        assert!(matches!(
            err,
            StoreError::QuotaExceeded {
                needed: 7,
                quota: 4,
                ..
            }
        ));
        assert_eq!(store.get("k"), Some("[1]"));
    }

    #[test]
    fn key_validation() {
        let store = FileBlobStore::new("/tmp/unused");
        assert!(store.path_for("wayfarer.events").is_ok());
        assert!(store.path_for("zone-log_2").is_ok());
        for bad in ["", ".hidden", "../escape", "a/b", "with space"] {
            assert!(
                matches!(store.path_for(bad), Err(StoreError::InvalidKey(_))),
                "{bad}"
            );
        }
    }
}
