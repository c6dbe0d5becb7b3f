//! Column model for dataset schemas

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Abstract column type as documented by the data dictionary.
///
/// Every variant must be handled by each SQL generator; the generators match
/// exhaustively so a new variant fails to compile until it is mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSchemaType {
    Bit,
    BigInt,
    Int,
    SmallInt,
    Decimal,
    Float,
    Varchar,
    NVarchar,
    DateTime2,
    UniqueIdentifier,
}

impl ColumnSchemaType {
    /// All known column types, in declaration order.
    pub const ALL: [ColumnSchemaType; 10] = [
        ColumnSchemaType::Bit,
        ColumnSchemaType::BigInt,
        ColumnSchemaType::Int,
        ColumnSchemaType::SmallInt,
        ColumnSchemaType::Decimal,
        ColumnSchemaType::Float,
        ColumnSchemaType::Varchar,
        ColumnSchemaType::NVarchar,
        ColumnSchemaType::DateTime2,
        ColumnSchemaType::UniqueIdentifier,
    ];

    /// Lower-case name used in dictionary pages and stored schemas.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnSchemaType::Bit => "bit",
            ColumnSchemaType::BigInt => "bigint",
            ColumnSchemaType::Int => "int",
            ColumnSchemaType::SmallInt => "smallint",
            ColumnSchemaType::Decimal => "decimal",
            ColumnSchemaType::Float => "float",
            ColumnSchemaType::Varchar => "varchar",
            ColumnSchemaType::NVarchar => "nvarchar",
            ColumnSchemaType::DateTime2 => "datetime2",
            ColumnSchemaType::UniqueIdentifier => "uniqueidentifier",
        }
    }
}

impl fmt::Display for ColumnSchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnSchemaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

/// One row of a dataset definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    /// Free-text version history; may be empty
    #[serde(default)]
    pub version_history: String,
    /// Column name, case preserved from the source page
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub column_type: ColumnSchemaType,
    /// Textual size: empty, a bare integer, or a "precision,scale" pair
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub can_be_null: bool,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_foreign: bool,
}

impl ColumnSchema {
    /// Create a nullable, non-key column with no history or description.
    ///
    /// # Example
    ///
    /// ```rust
    /// use datahub_schema::models::{ColumnSchema, ColumnSchemaType};
    ///
    /// let col = ColumnSchema::new("OrgUnitId", ColumnSchemaType::Int);
    /// assert!(col.can_be_null);
    /// assert!(!col.is_primary);
    /// ```
    pub fn new(name: impl Into<String>, column_type: ColumnSchemaType) -> Self {
        Self {
            version_history: String::new(),
            name: name.into(),
            description: String::new(),
            column_type,
            size: String::new(),
            can_be_null: true,
            is_primary: false,
            is_foreign: false,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the column as part of the primary key. Primary columns are not nullable.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.can_be_null = false;
        self
    }

    pub fn foreign(mut self) -> Self {
        self.is_foreign = true;
        self
    }

    pub fn nullable(mut self, can_be_null: bool) -> Self {
        self.can_be_null = can_be_null;
        self
    }

    /// Key text as rendered on dictionary pages ("PK", "FK" or "PK, FK").
    pub fn key_text(&self) -> String {
        let mut keys = Vec::new();
        if self.is_primary {
            keys.push("PK");
        }
        if self.is_foreign {
            keys.push("FK");
        }
        keys.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_from_str_is_case_insensitive() {
        assert_eq!("NVARCHAR".parse::<ColumnSchemaType>(), Ok(ColumnSchemaType::NVarchar));
        assert_eq!(" datetime2 ".parse::<ColumnSchemaType>(), Ok(ColumnSchemaType::DateTime2));
        assert_eq!("BigInt".parse::<ColumnSchemaType>(), Ok(ColumnSchemaType::BigInt));
        assert_eq!("text".parse::<ColumnSchemaType>(), Err("text".to_string()));
    }

    #[test]
    fn test_type_serializes_lowercase() {
        let json = serde_json::to_string(&ColumnSchemaType::UniqueIdentifier).unwrap();
        assert_eq!(json, "\"uniqueidentifier\"");
    }

    #[test]
    fn test_key_text() {
        let col = ColumnSchema::new("UserId", ColumnSchemaType::Int);
        assert_eq!(col.key_text(), "");
        assert_eq!(col.clone().primary().key_text(), "PK");
        assert_eq!(col.clone().foreign().key_text(), "FK");
        assert_eq!(col.primary().foreign().key_text(), "PK, FK");
    }

    #[test]
    fn test_column_json_field_names() {
        let col = ColumnSchema::new("UserId", ColumnSchemaType::Int).primary();
        let value = serde_json::to_value(&col).unwrap();
        assert_eq!(value["versionHistory"], "");
        assert_eq!(value["type"], "int");
        assert_eq!(value["canBeNull"], false);
        assert_eq!(value["isPrimary"], true);
    }
}
