//! File-based storage.

use super::{Storage, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each key as a JSON file in a directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory
    /// if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage directory: {}", e)))?;
        }
        Ok(Self { base_path })
    }

    /// Storage in the platform data directory.
    ///
    /// On Linux: `~/.local/share/folio/layouts/`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("folio").join("layouts"))
    }

    /// Keys map to file names with anything outside `[A-Za-z0-9_-]`
    /// replaced by `_`.
    fn entry_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.entry_path(key);
        fs::write(&path, value).map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn load(&self, key: &str) -> StorageResult<String> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        fs::read_to_string(&path).map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))?;
        }
        Ok(())
    }

    /// Lists sanitised file stems, which equal the keys for keys made of
    /// `[A-Za-z0-9_-]` only.
    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut keys: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.entry_path(key).exists())
    }
}
