//! Dataset model

use super::column::ColumnSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Documentation family of a dataset.
///
/// ADS pages document 4-column tables, BDS pages 6-column tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetSchemaType {
    #[serde(rename = "ADS")]
    Ads,
    #[default]
    #[serde(rename = "BDS")]
    Bds,
}

impl DatasetSchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetSchemaType::Ads => "ADS",
            DatasetSchemaType::Bds => "BDS",
        }
    }
}

impl fmt::Display for DatasetSchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetSchemaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADS" => Ok(DatasetSchemaType::Ads),
            "BDS" => Ok(DatasetSchemaType::Bds),
            _ => Err(format!(
                "Invalid dataset type '{}'. Valid options are 'ADS', 'BDS'",
                s
            )),
        }
    }
}

/// A single dataset extracted from a module page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    #[serde(rename = "type")]
    pub dataset_type: DatasetSchemaType,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    /// Columns in source row order; generated DDL follows this order
    pub columns: Vec<ColumnSchema>,
}

impl DatasetSchema {
    pub fn new(
        dataset_type: DatasetSchemaType,
        name: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
        columns: Vec<ColumnSchema>,
    ) -> Self {
        Self {
            dataset_type,
            name: name.into(),
            url: url.into(),
            description: description.into(),
            columns,
        }
    }

    /// Columns flagged as primary key, in original order.
    pub fn primary_columns(&self) -> Vec<&ColumnSchema> {
        self.columns.iter().filter(|c| c.is_primary).collect()
    }

    /// Simple name used for file names ("Grade Objects" -> "GRADE_OBJECTS").
    pub fn simple_name(&self) -> String {
        simple_name(&self.name)
    }
}

/// Upper-case a display name and replace spaces with underscores.
pub fn simple_name(name: &str) -> String {
    name.to_uppercase().replace(' ', "_")
}
