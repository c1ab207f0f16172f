//! Dynamic property value types and qualifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Level;

/// Declared type of a dynamic property.
///
/// Each details row stores its value in the column matching the property's
/// type; [`ValueType::text_projection`] maps a type to the SQL expression that
/// reads that column back as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Integer, stored in `value_num`.
    Int,
    /// Floating point, stored in `value_num`.
    Double,
    /// Boolean, stored in `value_bool`.
    Bool,
    /// Timestamp, stored in `value_datetime`.
    Datetime,
    /// Text, stored in `value_string`.
    String,
    /// UUID, stored in `value_uuid`.
    Uuid,
}

impl ValueType {
    /// Every value type.
    pub const ALL: [ValueType; 6] = [
        ValueType::Int,
        ValueType::Double,
        ValueType::Bool,
        ValueType::Datetime,
        ValueType::String,
        ValueType::Uuid,
    ];

    /// Returns the `properties.value_type` literal.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Double => "double",
            ValueType::Bool => "bool",
            ValueType::Datetime => "datetime",
            ValueType::String => "string",
            ValueType::Uuid => "uuid",
        }
    }

    /// Returns the text projection of the value column for this type on the
    /// given level's details table, or `None` when that table has no column
    /// for the type.
    ///
    /// Only assay result details store booleans; they store no datetimes or
    /// UUIDs.
    pub fn text_projection(&self, level: Level, details_alias: &str) -> Option<String> {
        let is_results = level == Level::AssayResults;
        match self {
            ValueType::Int | ValueType::Double => {
                Some(format!("{}.value_num::text", details_alias))
            }
            ValueType::String => Some(format!("{}.value_string", details_alias)),
            ValueType::Bool if is_results => Some(format!("{}.value_bool::text", details_alias)),
            ValueType::Bool => None,
            ValueType::Datetime if !is_results => {
                Some(format!("{}.value_datetime::text", details_alias))
            }
            ValueType::Uuid if !is_results => Some(format!("{}.value_uuid::text", details_alias)),
            ValueType::Datetime | ValueType::Uuid => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualifier attached to a stored numeric measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum ValueQualifier {
    /// The stored value is exact.
    Equals,
    /// The true value is below the stored value.
    LessThan,
    /// The true value is above the stored value.
    GreaterThan,
}

impl ValueQualifier {
    /// Returns the integer stored in `value_qualifier`.
    pub fn code(&self) -> i16 {
        match self {
            ValueQualifier::Equals => 0,
            ValueQualifier::LessThan => 1,
            ValueQualifier::GreaterThan => 2,
        }
    }

    /// Returns the symbol used when rendering a qualified value.
    pub fn symbol(&self) -> &'static str {
        match self {
            ValueQualifier::Equals => "",
            ValueQualifier::LessThan => "<",
            ValueQualifier::GreaterThan => ">",
        }
    }
}

impl From<ValueQualifier> for i16 {
    fn from(q: ValueQualifier) -> Self {
        q.code()
    }
}

impl TryFrom<i16> for ValueQualifier {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ValueQualifier::Equals),
            1 => Ok(ValueQualifier::LessThan),
            2 => Ok(ValueQualifier::GreaterThan),
            other => Err(format!("unknown value qualifier: {}", other)),
        }
    }
}
