//! Core KeyStore implementation

use fs2::FileExt;
use log::{debug, info, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::StoreError;

/// File extension for stored values
const VALUE_EXT: &str = "val";

/// Lock file guarding writes
const LOCK_FILE: &str = ".lock";

/// Options for opening a store
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Upper bound on total stored bytes (keys + values); `None` is unlimited
    pub quota_bytes: Option<u64>,
}

/// Bytes an entry counts against the quota
pub fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

/// Exclusive write lock, released on drop
struct WriteLock(fs::File);

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.0) {
            warn!("Failed to release store lock: {}", e);
        }
    }
}

/// The main key-value store
pub struct KeyStore {
    /// Base path for storage
    base_path: PathBuf,
    /// Optional byte quota
    quota_bytes: Option<u64>,
}

impl KeyStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self, StoreError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| StoreError::io(&base_path, e))?;
        debug!("Opened key store at {} (quota: {:?})", base_path.display(), options.quota_bytes);
        Ok(Self {
            base_path,
            quota_bytes: options.quota_bytes,
        })
    }

    /// Directory holding the store
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// Configured quota, if any
    pub fn quota_bytes(&self) -> Option<u64> {
        self.quota_bytes
    }

    /// Read the value stored under `key`
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => {
                debug!("get: {} ({} bytes)", key, value.len());
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("get: {} not found", key);
                Ok(None)
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Replace the value stored under `key`
    ///
    /// Rejected with [`StoreError::QuotaExceeded`] when the store would grow
    /// past its quota; the previous value is left untouched in that case.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.value_path(key)?;
        let _lock = self.lock()?;

        if let Some(quota) = self.quota_bytes {
            let needed = self.usage_excluding(Some(key))? + entry_size(key, value);
            if needed > quota {
                warn!("set: {} rejected, {} bytes needed with quota {}", key, needed, quota);
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        let mut tmp = tempfile::NamedTempFile::new_in(&self.base_path).map_err(|e| StoreError::io(&self.base_path, e))?;
        tmp.write_all(value.as_bytes()).map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| StoreError::io(&path, e.error))?;

        debug!("set: {} ({} bytes)", key, value.len());
        Ok(())
    }

    /// Remove `key`, returning whether it existed
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.value_path(key)?;
        let _lock = self.lock()?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed key {}", key);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StoreError::io(&self.base_path, e))?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.base_path, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_key(stem).is_ok()
            {
                keys.push(stem.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Total bytes counted against the quota
    pub fn usage(&self) -> Result<u64, StoreError> {
        self.usage_excluding(None)
    }

    fn usage_excluding(&self, skip: Option<&str>) -> Result<u64, StoreError> {
        let mut total = 0u64;
        for key in self.keys()? {
            if skip == Some(key.as_str()) {
                continue;
            }
            let path = self.base_path.join(format!("{}.{}", key, VALUE_EXT));
            let len = match fs::metadata(&path) {
                Ok(meta) => meta.len(),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::io(path, e)),
            };
            total += key.len() as u64 + len;
        }
        Ok(total)
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.{}", key, VALUE_EXT)))
    }

    fn lock(&self) -> Result<WriteLock, StoreError> {
        let path = self.base_path.join(LOCK_FILE);
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        file.lock_exclusive().map_err(|e| StoreError::io(&path, e))?;
        Ok(WriteLock(file))
    }
}

/// Keys are plain file stems: no separators, no hidden files
fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn open_store(quota_bytes: Option<u64>) -> (TempDir, KeyStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyStore::open(temp_dir.path().join("storage"), StoreOptions { quota_bytes }).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let (_dir, store) = open_store(None);
        assert_eq!(store.get("garden_projects").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites_value() {
        let (_dir, store) = open_store(None);
        store.set("garden_projects", "[1]").unwrap();
        store.set("garden_projects", "[1,2]").unwrap();
        assert_eq!(store.get("garden_projects").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(store.keys().unwrap(), vec!["garden_projects".to_string()]);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let (_dir, store) = open_store(None);
        for key in ["", "../escape", "a/b", ".lock", "with space"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "key {:?} should be invalid", key);
        }
    }

    #[test]
    fn test_quota_rejects_oversized_write_and_keeps_old_value() {
        let (_dir, store) = open_store(Some(20));
        store.set("k", "small").unwrap();

        let err = store.set("k", "this value is far too large").unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let (_dir, store) = open_store(Some(10));
        // "k" + 9 bytes = 10, exactly at quota
        store.set("k", "123456789").unwrap();
        // Replacing must not double count the old value
        store.set("k", "987654321").unwrap();
        assert_eq!(store.usage().unwrap(), 10);
    }

    #[test]
    fn test_remove() {
        let (_dir, store) = open_store(None);
        store.set("a", "1").unwrap();
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_lock_file_not_listed() {
        let (_dir, store) = open_store(None);
        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        assert!(store.path().join(LOCK_FILE).exists());
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_usage_is_sum_of_entries(entries in proptest::collection::btree_map("[a-z]{1,8}", ".{0,40}", 0..6)) {
            let (_dir, store) = open_store(None);
            let mut expected = 0u64;
            for (key, value) in &entries {
                store.set(key, value).unwrap();
                expected += entry_size(key, value);
            }
            prop_assert_eq!(store.usage().unwrap(), expected);
        }
    }
}
