//! Column table parsing
//!
//! Each dataset table row maps its `td` cells onto named fields using the
//! layout whose width matches the row, then the fields are coerced into a
//! [`ColumnSchema`].

use super::ImportError;
use super::config::ExtractionConfig;
use super::markup::{Document, NodeId};
use super::navigator::{find_child_by_name, find_children_by_name};
use super::text::clean;
use crate::models::{ColumnSchema, ColumnSchemaType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named field a table cell can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnField {
    VersionHistory,
    Name,
    Description,
    CanBeNull,
    Type,
    Size,
    Key,
}

/// Fixed mapping from cell position to field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnLayout {
    pub name: String,
    pub fields: Vec<ColumnField>,
}

impl ColumnLayout {
    /// 4-cell layout of ADS pages
    pub fn ads() -> Self {
        Self {
            name: "ADS".to_string(),
            fields: vec![
                ColumnField::VersionHistory,
                ColumnField::Name,
                ColumnField::Description,
                ColumnField::CanBeNull,
            ],
        }
    }

    /// 6-cell layout of BDS pages
    pub fn bds() -> Self {
        Self {
            name: "BDS".to_string(),
            fields: vec![
                ColumnField::VersionHistory,
                ColumnField::Name,
                ColumnField::Description,
                ColumnField::Type,
                ColumnField::Size,
                ColumnField::Key,
            ],
        }
    }
}

/// Raw field values of one table row
pub type ColumnFields = BTreeMap<ColumnField, String>;

/// Parse every `tbody > tr` row of a dataset table.
pub fn parse_columns(
    document: &Document,
    table: NodeId,
    config: &ExtractionConfig,
) -> Result<Vec<ColumnSchema>, ImportError> {
    let tbody = find_child_by_name(document, table, "tbody")?;
    find_children_by_name(document, tbody, "tr")
        .into_iter()
        .map(|row| column_from_fields(&row_fields(document, row, config)?))
        .collect()
}

/// Map a row's cells onto the layout selected by its cell count.
pub fn row_fields(
    document: &Document,
    row: NodeId,
    config: &ExtractionConfig,
) -> Result<ColumnFields, ImportError> {
    let cells = find_children_by_name(document, row, "td");
    let layout = config.layout_for(cells.len())?;
    Ok(layout
        .fields
        .iter()
        .copied()
        .zip(cells.iter().map(|cell| cell_text(document, *cell)))
        .collect())
}

/// Cell text: space-joined paragraphs when the cell has any, else the cell's own text.
fn cell_text(document: &Document, cell: NodeId) -> String {
    let paragraphs = find_children_by_name(document, cell, "p");
    if paragraphs.is_empty() {
        return clean(&document.text_content(cell));
    }
    paragraphs
        .iter()
        .map(|p| clean(&document.text_content(*p)))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Coerce raw field values into a column.
///
/// Rows without a type field are VARCHAR. Nullability comes from an explicit
/// can-be-null field when the layout has one, otherwise from the description
/// mentioning that the field can be null.
pub fn column_from_fields(fields: &ColumnFields) -> Result<ColumnSchema, ImportError> {
    let field = |f: ColumnField| fields.get(&f).map(String::as_str).unwrap_or("");

    let name = field(ColumnField::Name);
    if name.is_empty() {
        return Err(ImportError::MissingField("name".to_string()));
    }

    let column_type = match fields.get(&ColumnField::Type) {
        Some(value) => {
            value
                .parse::<ColumnSchemaType>()
                .map_err(|value| ImportError::InvalidColumnType {
                    column: name.to_string(),
                    value,
                })?
        }
        None => ColumnSchemaType::Varchar,
    };

    let description = field(ColumnField::Description);
    let can_be_null = match fields.get(&ColumnField::CanBeNull) {
        Some(value) => is_truthy(value),
        None => description.to_lowercase().contains("can be null"),
    };

    let key = field(ColumnField::Key);

    Ok(ColumnSchema {
        version_history: field(ColumnField::VersionHistory).to_string(),
        name: name.to_string(),
        description: description.to_string(),
        column_type,
        size: field(ColumnField::Size).to_string(),
        can_be_null,
        is_primary: key.contains("PK"),
        is_foreign: key.contains("FK"),
    })
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}
