//! Durable per-user key-value storage.
//!
//! Values are opaque strings (the callers store JSON).  `JsonFileStore` keeps
//! the whole map in one pretty-printed JSON file and rewrites it on every
//! mutation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StorageError;

pub const FAVOURITES_KEY: &str = "enguardia-favourites";
pub const LISTENED_KEY: &str = "enguardia-listened";
pub const SEARCH_FILTERS_KEY: &str = "enguardia-search-filters";
pub const INSTALL_HINT_KEY: &str = "enguardia-install-hint-dismissed";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// ── JSON file ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.  A missing file is an empty
    /// store; a corrupt one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    warn!("[storage] {} is corrupt, starting empty: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("[storage] cannot read {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!("[storage] opened {} ({} keys)", path.display(), entries.len());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────

/// Volatile store.  Counts writes so callers can observe persistence traffic.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set`/`remove` calls that changed storage.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.writes += 1;
        }
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_persists_across_opens() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state").join("storage.json");

        let mut store = JsonFileStore::open(&path);
        assert!(store.get(FAVOURITES_KEY).unwrap().is_none());
        store.set(FAVOURITES_KEY, r#"["a","b"]"#).unwrap();
        store.set(LISTENED_KEY, "[]").unwrap();
        store.remove(LISTENED_KEY).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(
            reopened.get(FAVOURITES_KEY).unwrap().as_deref(),
            Some(r#"["a","b"]"#)
        );
        assert!(reopened.get(LISTENED_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_store_corrupt_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::open(&path);
        assert!(store.get(FAVOURITES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.writes(), 2);
    }
}
