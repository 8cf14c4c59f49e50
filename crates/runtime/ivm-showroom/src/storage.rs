//! Key/value persistence with browser local-storage semantics
//!
//! Values are opaque strings (the store writes JSON into them). A visitor's
//! keys live together in one JSON object file.

use crate::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub mod keys {
    pub const SAVED_MODELS: &str = "ivm_savedModels";
    pub const COMPARE_LIST: &str = "ivm_compareList";
    pub const CONTACT_DRAFT: &str = "contactFormDraft";
}

pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// One JSON file per visitor.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<visitor>.json`, creating `dir` if needed.
    pub fn for_visitor(dir: &Path, visitor: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self::at_path(dir.join(format!("{visitor}.json"))))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(items)?;

        // Write to temp file first, then rename
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.items.lock().map_err(|_| crate::StoreError::Poisoned)
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::for_visitor(&dir.path().join("storage"), "v1").unwrap();

        assert_eq!(storage.get_item(keys::COMPARE_LIST).unwrap(), None);
        storage.set_item(keys::COMPARE_LIST, r#"["g80"]"#).unwrap();
        storage.set_item(keys::SAVED_MODELS, "[]").unwrap();

        let reopened = FileStorage::at_path(storage.path());
        assert_eq!(
            reopened.get_item(keys::COMPARE_LIST).unwrap().as_deref(),
            Some(r#"["g80"]"#)
        );

        reopened.remove_item(keys::COMPARE_LIST).unwrap();
        assert_eq!(storage.get_item(keys::COMPARE_LIST).unwrap(), None);
        assert_eq!(storage.get_item(keys::SAVED_MODELS).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::at_path(&path);
        assert!(matches!(
            storage.get_item(keys::CONTACT_DRAFT),
            Err(crate::StoreError::Json(_))
        ));
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        storage.remove_item("k").unwrap();
        assert!(storage.get_item("k").unwrap().is_none());
    }
}
