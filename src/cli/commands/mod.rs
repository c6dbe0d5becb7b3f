//! Command implementations
//!
//! Commands process a batch of modules or tables. A failing item is logged
//! and counted, and the batch moves on.

pub mod download;
pub mod generate_sql;

use std::fmt;

/// Outcome counts of a batch command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}
