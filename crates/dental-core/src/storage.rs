//! Key-value storage substrates
//!
//! Everything dental persists goes through [`Storage`]: read text by key,
//! write text by key, remove by key. Nothing else.

use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const PROBE_KEY: &str = "__dental_probe__";

/// Synchronous key-value substrate
pub trait Storage {
    /// Raw text stored under `key`, if any
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing what was there
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Check that the substrate accepts writes
    fn is_available(&self) -> bool {
        self.set_item(PROBE_KEY, PROBE_KEY).is_ok() && self.remove_item(PROBE_KEY).is_ok()
    }
}

/// In-process substrate with an optional byte quota
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes once keys and values together exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: RefCell::new(BTreeMap::new()),
            quota: Some(bytes),
        }
    }

    /// Bytes currently held, keys included
    pub fn used_bytes(&self) -> usize {
        self.items
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.borrow().keys().cloned().collect()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let existing = self
                .items
                .borrow()
                .get(key)
                .map(|v| key.len() + v.len())
                .unwrap_or(0);
            let needed = self.used_bytes() - existing + key.len() + value.len();
            if needed > quota {
                return Err(Error::persistence(
                    key,
                    format!("quota of {quota} bytes exceeded"),
                ));
            }
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Directory-backed substrate: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a data directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.item_path(key)) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read '{}' from {}: {}", key, self.dir.display(), e);
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.item_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        // Write aside then rename, so a failed write leaves the old file
        if let Err(e) = fs::write(&tmp, value) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::persistence(key, e));
        }
        fs::rename(&tmp, &path).map_err(|e| Error::persistence(key, e))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::persistence(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("a"), None);

        storage.set_item("a", "[1]").unwrap();
        assert_eq!(storage.get_item("a").as_deref(), Some("[1]"));

        storage.remove_item("a").unwrap();
        assert_eq!(storage.get_item("a"), None);
        storage.remove_item("a").unwrap();
    }

    #[test]
    fn test_memory_quota_rejects_and_keeps_old_value() {
        let storage = MemoryStorage::with_quota(12);
        storage.set_item("k", "short").unwrap();

        let err = storage.set_item("k", "far too long for it").unwrap_err();
        assert!(matches!(err, Error::Persistence { ref key, .. } if key == "k"));
        assert_eq!(storage.get_item("k").as_deref(), Some("short"));

        // Replacing a value only counts the difference
        storage.set_item("k", "0123456789a").unwrap();
    }

    #[test]
    fn test_is_available() {
        assert!(MemoryStorage::new().is_available());
        assert!(!MemoryStorage::with_quota(4).is_available());

        let storage = MemoryStorage::new();
        storage.is_available();
        assert!(storage.keys().is_empty());
    }
}
