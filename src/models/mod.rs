//! Models module
//!
//! Schema value types produced by extraction and consumed by the SQL generators,
//! plus the module descriptors that drive extraction.

pub mod column;
pub mod dataset;
pub mod module;

pub use column::{ColumnSchema, ColumnSchemaType};
pub use dataset::{DatasetSchema, DatasetSchemaType, simple_name};
pub use module::{DatasetModule, ModuleError, ModuleList, TableMap, table_map_from_json};
