//! Durable key-value storage
//!
//! A cart is persisted as one serialized snapshot in a named slot. The store
//! only deals in strings; encoding belongs to the cart.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors raised by a key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Slot names must be non-empty and contain only ASCII letters, digits, `-` or `_`.
    #[error("invalid slot name: {0:?}")]
    InvalidKey(String),

    /// Underlying I/O failure.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// A string key-value store holding named slots.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Reads a slot. A slot that was never written reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the slot cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites a slot.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the slot cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a slot. Removing a missing slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the slot exists but cannot be removed.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
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

/// Process-local store, mostly useful for tests and previews.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: FxHashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);

        Ok(())
    }
}

/// Store keeping each slot in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;

        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;

        fs::create_dir_all(&self.dir)?;

        // Write beside the slot then rename so readers never see half a snapshot.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;

        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_store_round_trip() -> TestResult {
        let mut store = MemoryStore::new();

        assert_eq!(store.get("cart")?, None);

        store.set("cart", "[]")?;
        assert_eq!(store.get("cart")?.as_deref(), Some("[]"));

        store.remove("cart")?;
        assert_eq!(store.get("cart")?, None);

        Ok(())
    }

    #[test]
    fn file_store_round_trip() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("cart")?, None);

        store.set("cart", r#"[{"id":"1"}]"#)?;
        assert_eq!(store.get("cart")?.as_deref(), Some(r#"[{"id":"1"}]"#));
        assert!(store.dir().join("cart.json").exists());

        store.remove("cart")?;
        assert_eq!(store.get("cart")?, None);

        Ok(())
    }

    #[test]
    fn file_store_remove_missing_slot_succeeds() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut store = FileStore::new(dir.path());

        store.remove("cart")?;

        Ok(())
    }

    #[test]
    fn file_store_rejects_path_like_keys() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut store = FileStore::new(dir.path());

        let result = store.set("../escape", "[]");

        assert!(
            matches!(result, Err(StorageError::InvalidKey(ref key)) if key == "../escape"),
            "expected InvalidKey, got {result:?}"
        );

        Ok(())
    }

    fn write_empty<S: KeyValueStore>(mut store: S) -> Result<(), StorageError> {
        store.set("cart", "[]")
    }

    #[test]
    fn mutable_reference_forwards_to_store() -> TestResult {
        let mut store = MemoryStore::new();

        write_empty(&mut store)?;

        assert_eq!(store.get("cart")?.as_deref(), Some("[]"));

        Ok(())
    }
}
