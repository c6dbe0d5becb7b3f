//! Import functionality
//!
//! Extracts dataset schemas from data dictionary pages:
//! - Markup tree building and navigation
//! - Text normalization
//! - Dataset segmentation (heading / paragraphs / table groups)
//! - Column table parsing
//! - Schema building against a module's dataset allow-list

pub mod columns;
pub mod config;
pub mod datahub;
pub mod markup;
pub mod navigator;
pub mod segmenter;
pub mod text;

/// Error during import
///
/// Every variant is fatal to the dataset or module being processed; callers
/// processing batches log it and continue with the next item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    /// A required structural node is missing from the document
    #[error("Element '{0}' not found")]
    NotFound(String),
    /// A dataset table row has a cell count with no known layout
    #[error("Invalid dataset type: row with {0} cells")]
    InvalidLayout(usize),
    #[error("Invalid column type '{value}' for column '{column}'")]
    InvalidColumnType { column: String, value: String },
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Failure while building one named dataset
    #[error("Dataset '{dataset}': {error}")]
    InDataset {
        dataset: String,
        error: Box<ImportError>,
    },
}

// Re-export for convenience
pub use columns::{ColumnField, ColumnFields, ColumnLayout, column_from_fields, parse_columns};
pub use config::{ExtractionConfig, SegmenterConfig};
pub use datahub::{DatasetSchemaBuilder, ModuleExtraction, dataset_url, missing_datasets};
pub use markup::{Document, NodeId};
pub use segmenter::{DatasetNodes, collect_dataset_nodes, find_main_content};
pub use text::{clean, clean_node};
