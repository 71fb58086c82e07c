//! File-based Local Storage Adapter
//!
//! Stores every key in a single JSON object on disk. The whole object is
//! rewritten through a temporary file and renamed into place on each change,
//! so a crash mid-write leaves the previous version intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::ports::{LocalStorage, StorageError};

/// File-backed key/value storage
#[derive(Debug)]
pub struct FileLocalStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileLocalStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// A missing file is an empty store. A file that is not a JSON object of
    /// strings is an error rather than silently discarded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| StorageError::Io(e.to_string()))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)
                    .map_err(|e| StorageError::Deserialization(e.to_string()))?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened local storage");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Io("storage lock poisoned".to_string()))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write the full map to disk.
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }
}

impl LocalStorage for FileLocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&entries) {
            // keep memory consistent with disk
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush(&entries) {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileLocalStorage::open(dir.path().join("session.json")).unwrap();
        assert_eq!(storage.get("authenticated").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        {
            let storage = FileLocalStorage::open(&path).unwrap();
            storage.set("authenticated", "true").unwrap();
            storage.set("admin", "true").unwrap();
            storage.remove("admin").unwrap();
        }

        let reopened = FileLocalStorage::open(&path).unwrap();
        assert!(reopened.flag("authenticated"));
        assert_eq!(reopened.get("admin").unwrap(), None);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileLocalStorage::open(&path).unwrap();
        storage.set("k", "v").unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("session.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let result = FileLocalStorage::open(&path);
        assert!(matches!(result, Err(StorageError::Deserialization(_))));
    }

    #[test]
    fn removing_absent_key_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileLocalStorage::open(&path).unwrap();

        storage.remove("admin").unwrap();
        assert!(!path.exists());
    }
}
