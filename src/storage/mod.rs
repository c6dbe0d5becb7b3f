//! Storage backend abstraction
//!
//! Defines the StorageBackend trait the schema repository persists through:
//! - FileSystemStorageBackend: schema directory on the native file system
//! - MemoryStorageBackend: process-local map, for tests and dry runs
//!
//! Paths are relative to the backend root and always use `/` separators.

use async_trait::async_trait;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Trait for storage backends
#[async_trait(?Send)]
pub trait StorageBackend: Send + Sync {
    /// Read a file from storage
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a file, creating parent directories as needed
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Names of the files directly inside a directory
    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError>;

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError>;

    async fn delete_file(&self, path: &str) -> Result<(), StorageError>;

    /// Create a directory and its parents
    async fn create_dir(&self, path: &str) -> Result<(), StorageError>;

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError>;
}

#[cfg(feature = "native-fs")]
pub mod filesystem;

pub mod memory;

#[cfg(feature = "native-fs")]
pub use filesystem::FileSystemStorageBackend;
pub use memory::MemoryStorageBackend;
