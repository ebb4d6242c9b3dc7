//! In-memory storage.

use super::{Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for tests and sessions that should not touch disk.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<String> {
        let entries = self.entries.read().map_err(lock_error)?;
        entries.get(key).cloned().ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        entries.remove(key);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let entries = self.entries.read().map_err(lock_error)?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_save_load() {
        let storage = MemoryStorage::new();
        storage.save("doc", "{\"a\":1}").unwrap();
        assert_eq!(storage.load("doc").unwrap(), "{\"a\":1}");
        storage.save("doc", "{}").unwrap();
        assert_eq!(storage.load("doc").unwrap(), "{}");
    }

    #[test]
    fn test_memory_storage_not_found() {
        let storage = MemoryStorage::new();
        assert!(matches!(storage.load("missing"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_memory_storage_list_and_delete() {
        let storage = MemoryStorage::new();
        storage.save("b", "2").unwrap();
        storage.save("a", "1").unwrap();
        assert_eq!(storage.list().unwrap(), vec!["a".to_string(), "b".to_string()]);

        storage.delete("a").unwrap();
        assert!(!storage.exists("a").unwrap());
        assert!(storage.exists("b").unwrap());
        storage.delete("a").unwrap();
    }
}
