//! Export functionality
//!
//! Provides exporters for dataset schemas:
//! - MySQL DDL
//! - Oracle DDL
//! - Regenerated and minified module HTML pages

pub mod html;
pub mod mysql;
pub mod oracle;

use crate::models::DatasetSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error during export
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("Invalid SQL type: {0}")]
    UnknownDialect(String),
}

/// Target SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SQLDialect {
    MySQL,
    Oracle,
}

impl SQLDialect {
    pub const ALL: [SQLDialect; 2] = [SQLDialect::MySQL, SQLDialect::Oracle];

    /// Lower-case name, also used as the dialect's directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            SQLDialect::MySQL => "mysql",
            SQLDialect::Oracle => "oracle",
        }
    }

    pub fn generator(&self) -> Box<dyn SQLTableGenerator> {
        match self {
            SQLDialect::MySQL => Box::new(MySQLTableGenerator),
            SQLDialect::Oracle => Box::new(OracleTableGenerator),
        }
    }
}

impl fmt::Display for SQLDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SQLDialect {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(SQLDialect::MySQL),
            "oracle" => Ok(SQLDialect::Oracle),
            _ => Err(ExportError::UnknownDialect(s.to_string())),
        }
    }
}

/// DDL generator for one dialect.
///
/// Generation is pure and deterministic. Callers wanting a staging table call
/// it again with the staging table's name.
pub trait SQLTableGenerator {
    fn dialect(&self) -> SQLDialect;

    /// Full DDL script (drop, create, index) for `dataset` as table `table_name`
    fn generate_table(&self, dataset: &DatasetSchema, table_name: &str) -> String;
}

/// Integer value of a size text, read like a lenient integer cast.
///
/// Leading whitespace and an optional sign are accepted, parsing stops at the
/// first non-digit, and text without leading digits is 0. Out-of-range values
/// saturate.
pub(crate) fn size_value(size: &str) -> i64 {
    let text = size.trim_start();
    let (negative, digits) = match text.as_bytes().first().copied() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative { -magnitude } else { magnitude }
}

// Re-export for convenience
pub use html::{ModuleHtmlExporter, minify_document};
pub use mysql::MySQLTableGenerator;
pub use oracle::OracleTableGenerator;
