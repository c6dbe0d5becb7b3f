//! Configuration types for extraction
//!
//! Block-lists, boilerplate labels and column layouts are data rather than
//! embedded literals so they can be substituted per deployment or in tests.

use super::ImportError;
use super::columns::ColumnLayout;
use serde::{Deserialize, Serialize};

/// Rules for grouping page nodes into datasets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmenterConfig {
    /// Headings containing any of these titles never start a dataset
    pub blocked_headings: Vec<String>,
    /// Only tables with a `thead` child close a dataset group
    pub require_thead: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            blocked_headings: vec![
                "Entity Relationship Diagram".to_string(),
                "Deleting Outcome Objects".to_string(),
                "Sample join".to_string(),
            ],
            require_thead: true,
        }
    }
}

impl SegmenterConfig {
    pub fn is_blocked(&self, heading: &str) -> bool {
        self.blocked_headings
            .iter()
            .any(|blocked| heading.contains(blocked.as_str()))
    }
}

/// Full extraction configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    pub segmenter: SegmenterConfig,
    /// Paragraph labels dropped from dataset descriptions (compared lower-cased)
    pub boilerplate_labels: Vec<String>,
    /// Column layouts, selected by row cell count
    pub layouts: Vec<ColumnLayout>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            boilerplate_labels: vec![
                "about".to_string(),
                "returned fields".to_string(),
                "available filters".to_string(),
            ],
            layouts: vec![ColumnLayout::ads(), ColumnLayout::bds()],
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from TOML; omitted keys keep their defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use datahub_schema::import::ExtractionConfig;
    ///
    /// let config = ExtractionConfig::from_toml("[segmenter]\nrequire_thead = false\n").unwrap();
    /// assert!(!config.segmenter.require_thead);
    /// assert_eq!(config.layouts.len(), 2);
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self, ImportError> {
        toml::from_str(text)
            .map_err(|e| ImportError::ParseError(format!("Invalid extraction config: {}", e)))
    }

    /// Whether a cleaned paragraph carries no description content
    pub fn is_boilerplate(&self, paragraph: &str) -> bool {
        let lower = paragraph.to_lowercase();
        lower.is_empty()
            || self
                .boilerplate_labels
                .iter()
                .any(|label| label.to_lowercase() == lower)
    }

    /// Layout for a row with `cells` cells
    pub fn layout_for(&self, cells: usize) -> Result<&ColumnLayout, ImportError> {
        self.layouts
            .iter()
            .find(|layout| layout.fields.len() == cells)
            .ok_or(ImportError::InvalidLayout(cells))
    }
}
