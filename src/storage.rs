//! Secure key-value storage backing the wallet.
//!
//! The wallet keeps all of its state as string values under a handful of
//! fixed keys, the same layout a mobile secure-storage API offers. Backends
//! only need to provide get/set/remove; `set_items` must be atomic.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

pub const ACCOUNTS_KEY: &str = "new accounts";
pub const PASSWORD_KEY: &str = "newPassword";
pub const MNEMONIC_KEY: &str = "mnemonic";
pub const NEXT_INDEX_KEY: &str = "fetchedAccountIndex";
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Every key the wallet writes
pub const WALLET_KEYS: [&str; 5] = [
    ACCOUNTS_KEY,
    PASSWORD_KEY,
    MNEMONIC_KEY,
    NEXT_INDEX_KEY,
    SCHEMA_VERSION_KEY,
];

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Stored value under '{0}' is not valid UTF-8")]
    Encoding(String),
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A string key-value store with secure-storage semantics
pub trait SecureStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Write several values at once. `None` removes the key.
    /// Either every change lands or none does.
    fn set_items(&self, items: &[(&str, Option<&str>)]) -> Result<(), StorageError>;
}

/// Volatile store, used by tests and the `memory` backend
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecureStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }

    fn set_items(&self, changes: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in changes {
            match value {
                Some(v) => {
                    items.insert(key.to_string(), v.to_string());
                }
                None => {
                    items.remove(*key);
                }
            }
        }
        Ok(())
    }
}

/// On-disk store backed by sled. Every write is flushed before returning.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        debug!("Opening sled store at '{}'", path.display());
        let db = sled::open(path)?;
        Ok(SledStore { db })
    }
}

impl SecureStore for SledStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(raw) => {
                let value = String::from_utf8(raw.to_vec())
                    .map_err(|_| StorageError::Encoding(key.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn set_items(&self, items: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        let mut batch = sled::Batch::default();
        for (key, value) in items {
            match value {
                Some(v) => batch.insert(key.as_bytes(), v.as_bytes()),
                None => batch.remove(key.as_bytes()),
            }
        }
        self.db.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn SecureStore) {
        assert_eq!(store.get_item("a").unwrap(), None);
        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));

        store.set_items(&[("a", None), ("b", Some("2")), ("c", Some("3"))]).unwrap();
        assert_eq!(store.get_item("a").unwrap(), None);
        assert_eq!(store.get_item("b").unwrap().as_deref(), Some("2"));
        assert_eq!(store.get_item("c").unwrap().as_deref(), Some("3"));

        store.remove_item("b").unwrap();
        assert_eq!(store.get_item("b").unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_sled_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path().join("db")).unwrap();
        exercise(&store);
    }

    #[test]
    fn test_sled_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        {
            let store = SledStore::open(&path).unwrap();
            store.set_item(ACCOUNTS_KEY, "[]").unwrap();
        }
        let store = SledStore::open(&path).unwrap();
        assert_eq!(store.get_item(ACCOUNTS_KEY).unwrap().as_deref(), Some("[]"));
    }
}
