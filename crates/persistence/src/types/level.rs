//! Searchable entity levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the five searchable entity levels.
///
/// Serialized as the primary table name (`assay_runs`). Parsing also accepts
/// the URL slug form (`assay-runs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Registered compounds.
    Compounds,
    /// Physical batches of a compound.
    Batches,
    /// Assay definitions.
    Assays,
    /// Executions of an assay.
    #[serde(alias = "assay-runs")]
    AssayRuns,
    /// Individual measurements of a batch within an assay run.
    #[serde(alias = "assay-results")]
    AssayResults,
}

impl Level {
    /// Every level, in declaration order.
    pub const ALL: [Level; 5] = [
        Level::Compounds,
        Level::Batches,
        Level::Assays,
        Level::AssayRuns,
        Level::AssayResults,
    ];

    /// Returns the primary table name for this level.
    pub fn table_name(&self) -> &'static str {
        match self {
            Level::Compounds => "compounds",
            Level::Batches => "batches",
            Level::Assays => "assays",
            Level::AssayRuns => "assay_runs",
            Level::AssayResults => "assay_results",
        }
    }

    /// Returns the singular form used in details table and foreign key names.
    pub fn singular(&self) -> &'static str {
        match self {
            Level::Compounds => "compound",
            Level::Batches => "batch",
            Level::Assays => "assay",
            Level::AssayRuns => "assay_run",
            Level::AssayResults => "assay_result",
        }
    }

    /// Returns the URL path segment for this level.
    pub fn slug(&self) -> &'static str {
        match self {
            Level::Compounds => "compounds",
            Level::Batches => "batches",
            Level::Assays => "assays",
            Level::AssayRuns => "assay-runs",
            Level::AssayResults => "assay-results",
        }
    }

    /// Looks up a level by its table name.
    pub fn from_table_name(name: &str) -> Option<Level> {
        Level::ALL.into_iter().find(|l| l.table_name() == name)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for Level {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Level::ALL
            .into_iter()
            .find(|l| l.table_name() == s || l.slug() == s)
            .ok_or_else(|| ValidationError::UnknownLevel {
                level: s.to_string(),
            })
    }
}
