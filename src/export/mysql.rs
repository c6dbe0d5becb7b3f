//! MySQL DDL generator
//!
//! Identifiers are always back-quoted, with internal backticks doubled.

use super::{SQLDialect, SQLTableGenerator, size_value};
use crate::models::{ColumnSchema, ColumnSchemaType, DatasetSchema};

const MAX_VARCHAR: i64 = 9999;

/// Generator for MySQL `CREATE TABLE` scripts (InnoDB, utf8mb4).
pub struct MySQLTableGenerator;

impl SQLTableGenerator for MySQLTableGenerator {
    fn dialect(&self) -> SQLDialect {
        SQLDialect::MySQL
    }

    /// # Example
    ///
    /// ```rust
    /// use datahub_schema::export::{MySQLTableGenerator, SQLTableGenerator};
    /// use datahub_schema::models::{ColumnSchema, ColumnSchemaType, DatasetSchema, DatasetSchemaType};
    ///
    /// let dataset = DatasetSchema::new(
    ///     DatasetSchemaType::Bds,
    ///     "Users",
    ///     "https://example.com/users#users",
    ///     "",
    ///     vec![ColumnSchema::new("UserId", ColumnSchemaType::Int).primary()],
    /// );
    /// let sql = MySQLTableGenerator.generate_table(&dataset, "USERS");
    /// assert!(sql.starts_with("DROP TABLE IF EXISTS `USERS`;"));
    /// assert!(sql.contains("  `UserId` INT NOT NULL,\n  UNIQUE KEY (`UserId`)"));
    /// ```
    fn generate_table(&self, dataset: &DatasetSchema, table_name: &str) -> String {
        let mut body: Vec<String> = dataset.columns.iter().map(Self::column_sql).collect();
        if let Some(index) = Self::index_sql(dataset) {
            body.push(index);
        }

        let table = Self::quote_identifier(table_name);
        [
            format!("DROP TABLE IF EXISTS {};", table),
            String::new(),
            format!("CREATE TABLE {} (", table),
            body.join(",\n"),
            ") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci;".to_string(),
        ]
        .join("\n")
    }
}

impl MySQLTableGenerator {
    fn column_sql(column: &ColumnSchema) -> String {
        // Nullable primary keys stay nullable
        let nullability = if column.is_primary && !column.can_be_null {
            "NOT NULL"
        } else {
            "DEFAULT NULL"
        };
        format!(
            "  {} {} {}",
            Self::quote_identifier(&column.name),
            Self::column_type(column),
            nullability
        )
    }

    fn index_sql(dataset: &DatasetSchema) -> Option<String> {
        let keys: Vec<String> = dataset
            .primary_columns()
            .iter()
            .map(|column| Self::quote_identifier(&column.name))
            .collect();
        if keys.is_empty() {
            return None;
        }
        Some(format!("  UNIQUE KEY ({})", keys.join(", ")))
    }

    fn column_type(column: &ColumnSchema) -> String {
        match column.column_type {
            ColumnSchemaType::Bit => "TINYINT".to_string(),
            ColumnSchemaType::BigInt => "BIGINT".to_string(),
            ColumnSchemaType::Int => "INT".to_string(),
            ColumnSchemaType::SmallInt => "SMALLINT".to_string(),
            ColumnSchemaType::Float => "FLOAT".to_string(),
            ColumnSchemaType::Decimal if column.size.is_empty() => "DECIMAL".to_string(),
            ColumnSchemaType::Decimal => format!("DECIMAL({})", column.size),
            ColumnSchemaType::Varchar | ColumnSchemaType::NVarchar => format!(
                "VARCHAR({})",
                size_value(&column.size).clamp(1, MAX_VARCHAR)
            ),
            ColumnSchemaType::DateTime2 => "DATETIME".to_string(),
            ColumnSchemaType::UniqueIdentifier => "VARCHAR(36)".to_string(),
        }
    }

    /// Back-quote an identifier, doubling internal backticks
    fn quote_identifier(identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "``"))
    }
}
