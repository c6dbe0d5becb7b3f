//! File system storage backend
//!
//! Stores the schema directory (module pages, dataset JSON, table maps and
//! generated SQL) on the native file system.
//!
//! ## Security
//!
//! Paths containing ".." are rejected, and resolved paths of existing entries
//! must stay within the base directory.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File system storage backend
pub struct FileSystemStorageBackend {
    base_path: PathBuf,
}

impl FileSystemStorageBackend {
    /// Create a backend rooted at `base_path`
    ///
    /// # Example
    ///
    /// ```rust
    /// use datahub_schema::storage::filesystem::FileSystemStorageBackend;
    ///
    /// let backend = FileSystemStorageBackend::new("./schema");
    /// assert!(backend.base_path().ends_with("schema"));
    /// ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a relative path under the base path, rejecting traversal
    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let normalized = path.trim_start_matches('/');
        if normalized.contains("..") {
            return Err(StorageError::PermissionDenied(format!(
                "Path traversal (..) not allowed: {}",
                path
            )));
        }

        let full = self.base_path.join(normalized);
        if full
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(StorageError::PermissionDenied(format!(
                "Path traversal not allowed: {}",
                path
            )));
        }

        // Symlinks may still point outside; check whatever already exists
        let existing = if full.exists() {
            Some(full.as_path())
        } else {
            full.parent().filter(|parent| parent.exists())
        };
        if let Some(existing) = existing {
            let canonical = existing
                .canonicalize()
                .map_err(|e| StorageError::IoError(format!("Failed to resolve {}: {}", path, e)))?;
            let base = self
                .base_path
                .canonicalize()
                .unwrap_or_else(|_| self.base_path.clone());
            if !canonical.starts_with(&base) {
                return Err(StorageError::PermissionDenied(format!(
                    "Path escapes base directory: {}",
                    path
                )));
            }
        }

        Ok(full)
    }
}

fn io_error(action: &str, path: &str, e: std::io::Error) -> StorageError {
    StorageError::IoError(format!("Failed to {} {}: {}", action, path, e))
}

#[async_trait(?Send)]
impl StorageBackend for FileSystemStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve_path(path)?;
        fs::read(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            _ => io_error("read file", path, e),
        })
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", path, e))?;
        }
        fs::write(&full_path, content)
            .await
            .map_err(|e| io_error("write file", path, e))?;
        debug!(path = %path, bytes = content.len(), "Wrote file");
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let full_path = self.resolve_path(dir)?;
        let mut read_dir = fs::read_dir(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::DirectoryNotFound(dir.to_string()),
            _ => io_error("read directory", dir, e),
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| io_error("read directory entry in", dir, e))?
        {
            if let Ok(file_type) = entry.file_type().await
                && file_type.is_file()
                && let Some(file_name) = entry.file_name().to_str()
            {
                entries.push(file_name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;
        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("check file", path, e)),
        }
    }

    async fn delete_file(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;
        fs::remove_file(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            _ => io_error("delete file", path, e),
        })
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;
        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| io_error("create directory", path, e))
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;
        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("check directory", path, e)),
        }
    }
}
