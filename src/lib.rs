//! DataHub Schema - dataset schemas from data dictionary pages
//!
//! Provides:
//! - Extraction of dataset schemas from module pages (lenient HTML parsing,
//!   segmentation, column table parsing)
//! - MySQL and Oracle DDL generation
//! - Regenerated and minified module pages
//! - A schema repository over pluggable storage backends
//! - Module page download (feature `download`)

pub mod export;
pub mod import;
pub mod models;
pub mod repository;
pub mod storage;

#[cfg(feature = "download")]
pub mod download;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use storage::{MemoryStorageBackend, StorageBackend, StorageError};
#[cfg(feature = "native-fs")]
pub use storage::filesystem::FileSystemStorageBackend;

pub use export::{
    ExportError, ModuleHtmlExporter, MySQLTableGenerator, OracleTableGenerator, SQLDialect,
    SQLTableGenerator,
};
pub use import::{DatasetSchemaBuilder, Document, ExtractionConfig, ImportError};
pub use repository::{RepositoryError, SchemaRepository};

#[cfg(feature = "download")]
pub use download::{DownloadError, ModuleDownloader};

// Re-export models
pub use models::{
    ColumnSchema, ColumnSchemaType, DatasetModule, DatasetSchema, DatasetSchemaType, ModuleList,
    TableMap,
};
