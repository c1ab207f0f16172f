//! SQL fragments and bound parameters.
//!
//! Fragments use PostgreSQL `$N` placeholders. Builders take a `param_offset`
//! (the number of parameters already allocated by the caller) and number
//! their own placeholders from `param_offset + 1`; the caller advances the
//! offset by `params.len()` before building the next fragment.
//!
//! Every parameter is bound as `TEXT` and cast in SQL to the type it is
//! compared against, so binding never depends on the server inferring the
//! parameter type.

use std::fmt;

use serde_json::Value;

/// A SQL fragment with associated parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// The SQL string with $N placeholders.
    pub sql: String,
    /// The parameter values.
    pub params: Vec<SqlParam>,
}

/// A SQL parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text parameter.
    Text(String),
    /// Floating point parameter.
    Float(f64),
    /// Integer parameter.
    Integer(i64),
    /// Boolean parameter.
    Bool(bool),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a text parameter.
    pub fn text(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }

    /// Converts a scalar JSON value. Arrays and objects yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(SqlParam::Text(s.clone())),
            Value::Bool(b) => Some(SqlParam::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(SqlParam::Integer)
                .or_else(|| n.as_f64().map(SqlParam::Float)),
            Value::Null => Some(SqlParam::Null),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Returns the text form bound to the `$N::text` placeholder.
    pub fn to_text(&self) -> Option<String> {
        match self {
            SqlParam::Text(s) => Some(s.clone()),
            SqlParam::Float(f) => Some(f.to_string()),
            SqlParam::Integer(i) => Some(i.to_string()),
            SqlParam::Bool(b) => Some(b.to_string()),
            SqlParam::Null => None,
        }
    }
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("NULL"),
        }
    }
}

impl SqlFragment {
    /// Creates a fragment with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Combines two fragments with AND.
    pub fn and(self, other: SqlFragment) -> SqlFragment {
        SqlFragment {
            sql: format!("{} AND {}", self.sql, other.sql),
            params: [self.params, other.params].concat(),
        }
    }
}

/// Renders the text placeholder for 1-based parameter `index`, optionally
/// cast to `cast`.
pub fn placeholder(index: usize, cast: Option<&str>) -> String {
    match cast {
        Some(ty) => format!("CAST(${}::text AS {})", index, ty),
        None => format!("${}::text", index),
    }
}
