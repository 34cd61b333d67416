//! Durable string → string storage shared by the credential manager and the
//! local library.
//!
//! Each mutation is atomic for its single key; nothing more is promised. TTLs
//! and eviction are the caller's business.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::AnnotatifyError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AnnotatifyError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AnnotatifyError>;
    fn clear(&self, key: &str) -> Result<(), AnnotatifyError>;
}

/// Default on-disk location: `~/.annotatify/storage.json`.
pub fn default_storage_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".annotatify")
        .join("storage.json")
}

fn poisoned() -> AnnotatifyError {
    AnnotatifyError::StorageError("store lock poisoned".into())
}

/// A JSON object on disk, rewritten whole on every mutation.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`. A missing file is an empty
    /// store; a malformed one is an error rather than silently discarded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AnnotatifyError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(data) if data.trim().is_empty() => BTreeMap::new(),
            Ok(data) => serde_json::from_str(&data).map_err(|e| {
                AnnotatifyError::StorageError(format!(
                    "Failed to parse {}: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), AnnotatifyError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(entries).map_err(|e| {
            AnnotatifyError::StorageError(format!("Failed to serialize store: {e}"))
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AnnotatifyError> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    // Mutations go to a copy; memory only changes once the file has.
    fn set(&self, key: &str, value: &str) -> Result<(), AnnotatifyError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), AnnotatifyError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AnnotatifyError> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AnnotatifyError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), AnnotatifyError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_structure() {
        let path = default_storage_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.contains(".annotatify"));
        assert!(path_str.ends_with("storage.json"));
    }

    #[test]
    fn memory_store_set_get_clear() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        store.clear("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        // clearing a missing key is fine
        store.clear("k").unwrap();
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested").join("storage.json")).unwrap();
        assert_eq!(store.get("access_token").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::open(&path).unwrap();
        store.set("access_token", "AT1").unwrap();
        store.set("song-abc", "great bridge").unwrap();
        store.clear("access_token").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("access_token").unwrap(), None);
        assert_eq!(
            reopened.get("song-abc").unwrap().as_deref(),
            Some("great bridge")
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("nested");
        let store = FileStore::open(parent.join("storage.json")).unwrap();
        store.set("access_token", "AT-OLD").unwrap();

        // A regular file where the directory used to be makes every write fail.
        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, "blocker").unwrap();

        assert!(store.set("access_token", "AT-NEW").is_err());
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("AT-OLD"));
        assert!(store.set("song-abc", "note").is_err());
        assert_eq!(store.get("song-abc").unwrap(), None);
        assert!(store.clear("access_token").is_err());
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("AT-OLD"));
    }

    #[test]
    fn file_store_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = FileStore::open(&path).err().unwrap();
        assert!(matches!(err, AnnotatifyError::StorageError(_)));
    }
}
