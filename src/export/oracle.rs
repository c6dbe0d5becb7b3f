//! Oracle DDL generator
//!
//! Identifiers are emitted bare. Column names colliding with the reserved
//! words below get a `D2L` prefix wherever they appear.

use super::{SQLDialect, SQLTableGenerator, size_value};
use crate::models::{ColumnSchema, ColumnSchemaType, DatasetSchema};

const RESERVED_WORDS: &[&str] = &["group", "comment", "order"];
const RESERVED_PREFIX: &str = "D2L";
const MAX_VARCHAR2: i64 = 4000;

/// Generator for Oracle `CREATE TABLE` scripts run through SQL*Plus.
pub struct OracleTableGenerator;

impl SQLTableGenerator for OracleTableGenerator {
    fn dialect(&self) -> SQLDialect {
        SQLDialect::Oracle
    }

    fn generate_table(&self, dataset: &DatasetSchema, table_name: &str) -> String {
        let columns: Vec<String> = dataset.columns.iter().map(Self::column_sql).collect();

        let mut lines = vec![
            format!("DROP TABLE {};", table_name),
            String::new(),
            format!("CREATE TABLE {} (", table_name),
            columns.join(",\n"),
            ");".to_string(),
        ];
        lines.extend(Self::index_sql(dataset, table_name));
        lines.push(String::new());
        lines.push("QUIT;".to_string());
        lines.join("\n")
    }
}

impl OracleTableGenerator {
    fn column_sql(column: &ColumnSchema) -> String {
        let nullability = if column.is_primary {
            "NOT NULL"
        } else {
            "DEFAULT NULL"
        };
        format!(
            "  {} {} {}",
            Self::column_name(&column.name),
            Self::column_type(column),
            nullability
        )
    }

    /// Lines of the unique index over the primary columns, empty without any
    fn index_sql(dataset: &DatasetSchema, table_name: &str) -> Vec<String> {
        let keys: Vec<String> = dataset
            .primary_columns()
            .iter()
            .map(|column| format!("  {}", Self::column_name(&column.name)))
            .collect();
        if keys.is_empty() {
            return Vec::new();
        }
        vec![
            String::new(),
            format!("CREATE UNIQUE INDEX {0}_PK ON {0} (", table_name),
            keys.join(",\n"),
            ");".to_string(),
        ]
    }

    fn column_name(name: &str) -> String {
        if RESERVED_WORDS.contains(&name.to_lowercase().as_str()) {
            format!("{}{}", RESERVED_PREFIX, name)
        } else {
            name.to_string()
        }
    }

    fn column_type(column: &ColumnSchema) -> String {
        // Character lengths are doubled to leave room for multi-byte text
        let doubled = || size_value(&column.size).max(1).saturating_mul(2).min(MAX_VARCHAR2);
        let sized = |name: &str| {
            if column.size.is_empty() {
                name.to_string()
            } else {
                format!("{}({})", name, column.size)
            }
        };

        match column.column_type {
            ColumnSchemaType::Bit => "NUMBER(1)".to_string(),
            ColumnSchemaType::BigInt => "NUMBER(20)".to_string(),
            ColumnSchemaType::Int => "NUMBER(10)".to_string(),
            ColumnSchemaType::SmallInt => "NUMBER(5)".to_string(),
            ColumnSchemaType::Decimal => sized("DECIMAL"),
            ColumnSchemaType::Float => sized("FLOAT"),
            ColumnSchemaType::Varchar => format!("VARCHAR2({} CHAR)", doubled()),
            ColumnSchemaType::NVarchar => format!("NVARCHAR2({})", doubled()),
            ColumnSchemaType::DateTime2 => "TIMESTAMP WITH LOCAL TIME ZONE".to_string(),
            ColumnSchemaType::UniqueIdentifier => "VARCHAR2(36)".to_string(),
        }
    }
}
