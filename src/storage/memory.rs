//! In-memory storage backend
//!
//! Keeps files in a path-keyed map. Directories exist implicitly while they
//! hold a file, or explicitly once created.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Entries {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

/// Storage backend holding everything in memory
#[derive(Debug, Default)]
pub struct MemoryStorageBackend {
    entries: Mutex<Entries>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored file paths in sorted order
    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn normalize(path: &str) -> Result<String, StorageError> {
    let normalized = path.trim_matches('/');
    if normalized.split('/').any(|part| part == "..") {
        return Err(StorageError::PermissionDenied(format!(
            "Path traversal (..) not allowed: {}",
            path
        )));
    }
    Ok(normalized.to_string())
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

#[async_trait(?Send)]
impl StorageBackend for MemoryStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let key = normalize(path)?;
        self.lock()
            .files
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let key = normalize(path)?;
        self.lock().files.insert(key, content.to_vec());
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let dir_key = normalize(dir)?;
        let entries = self.lock();
        let files: Vec<String> = entries
            .files
            .keys()
            .filter(|key| parent_of(key) == dir_key)
            .map(|key| key.rsplit('/').next().unwrap_or_default().to_string())
            .collect();

        let has_children = entries
            .files
            .keys()
            .any(|key| key.starts_with(&format!("{}/", dir_key)));
        if files.is_empty() && !has_children && !entries.dirs.contains(&dir_key) {
            return Err(StorageError::DirectoryNotFound(dir.to_string()));
        }
        Ok(files)
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = normalize(path)?;
        Ok(self.lock().files.contains_key(&key))
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        let key = normalize(path)?;
        self.lock()
            .files
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let key = normalize(path)?;
        self.lock().dirs.insert(key);
        Ok(())
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = normalize(path)?;
        let entries = self.lock();
        let prefix = format!("{}/", key);
        Ok(entries.dirs.contains(&key) || entries.files.keys().any(|k| k.starts_with(&prefix)))
    }
}
