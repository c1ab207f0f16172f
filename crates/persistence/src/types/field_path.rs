//! Dotted field paths.
//!
//! A field path addresses either a physical column of a level's primary table
//! or a dynamic property stored in the level's details table:
//!
//! ```text
//! compounds.canonical_smiles          direct column
//! batches.details.corporate_batch_id  dynamic property
//! ```
//!
//! Property names may contain spaces and are matched case-insensitively at
//! query time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Level;
use crate::error::ValidationError;

/// Middle segment marking a dynamic property path.
pub const DETAILS_SEGMENT: &str = "details";

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldPath {
    /// `<level>.<column>`
    Direct {
        /// Level owning the column.
        level: Level,
        /// Column (or virtual field) name.
        column: String,
    },
    /// `<level>.details.<property>`
    Dynamic {
        /// Level owning the details table.
        level: Level,
        /// Property name as supplied by the caller.
        property: String,
    },
}

impl FieldPath {
    /// Creates a direct field path.
    pub fn direct(level: Level, column: impl Into<String>) -> Self {
        FieldPath::Direct {
            level,
            column: column.into(),
        }
    }

    /// Creates a dynamic property path.
    pub fn dynamic(level: Level, property: impl Into<String>) -> Self {
        FieldPath::Dynamic {
            level,
            property: property.into(),
        }
    }

    /// Returns the level addressed by the first segment.
    pub fn level(&self) -> Level {
        match self {
            FieldPath::Direct { level, .. } | FieldPath::Dynamic { level, .. } => *level,
        }
    }

    /// Returns the last segment: the column or property name.
    pub fn name(&self) -> &str {
        match self {
            FieldPath::Direct { column, .. } => column,
            FieldPath::Dynamic { property, .. } => property,
        }
    }

    /// Returns true for `<level>.details.<property>` paths.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, FieldPath::Dynamic { .. })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Direct { level, column } => write!(f, "{}.{}", level, column),
            FieldPath::Dynamic { level, property } => {
                write!(f, "{}.{}.{}", level, DETAILS_SEGMENT, property)
            }
        }
    }
}

impl FromStr for FieldPath {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ValidationError::InvalidFieldPath {
            path: s.to_string(),
            message: message.to_string(),
        };

        let parts: Vec<&str> = s.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid(
                "expected '<level>.<field>' or '<level>.details.<property>'",
            ));
        }
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid("path segments must not be empty"));
        }

        let level = Level::from_table_name(parts[0])
            .ok_or_else(|| invalid(&format!("unknown table '{}'", parts[0])))?;

        match parts.as_slice() {
            [_, column] => Ok(FieldPath::direct(level, *column)),
            [_, middle, property] if *middle == DETAILS_SEGMENT => {
                Ok(FieldPath::dynamic(level, *property))
            }
            _ => Err(invalid("middle segment must be 'details'")),
        }
    }
}

impl TryFrom<String> for FieldPath {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}
