//! Search results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::Level;

/// Rows returned by an advanced search.
///
/// `columns` holds display names (`compounds.molregno`,
/// `AVG(assay_results.details.clearance)`) in output-list order; every row has
/// one value per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The searched level.
    pub level: Level,
    /// Display column names.
    pub columns: Vec<String>,
    /// Row values, positionally aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl SearchResult {
    /// Creates an empty result with the given columns.
    pub fn new(level: Level, columns: Vec<String>) -> Self {
        Self {
            level,
            columns,
            rows: Vec::new(),
        }
    }

    /// Sets the rows.
    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = rows;
        self
    }

    /// Number of rows.
    pub fn total_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns each row as an object keyed by column name.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Renders the JSON response envelope.
    pub fn to_json(&self) -> Value {
        json!({
            "status": "success",
            "total_count": self.total_count(),
            "level": self.level,
            "columns": self.columns,
            "data": self.records(),
        })
    }
}
