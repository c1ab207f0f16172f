//! Schema introspection.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StorageResult;

/// A column as reported by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// `data_type` (e.g. `integer`, `text`, `USER-DEFINED`, `ARRAY`).
    pub data_type: String,
    /// `udt_name` (e.g. `int4`, `mol`, `_text`).
    pub udt_name: String,
}

impl ColumnInfo {
    /// Creates a column whose `udt_name` equals its `data_type`.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        let data_type = data_type.into();
        Self {
            name: name.into(),
            udt_name: data_type.clone(),
            data_type,
        }
    }

    /// Sets the underlying type name.
    pub fn with_udt(mut self, udt_name: impl Into<String>) -> Self {
        self.udt_name = udt_name.into();
        self
    }
}

/// Reports the columns of tables in the search schema.
///
/// Missing tables yield an empty column list rather than an error.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// Returns the columns of `table`, in ordinal order.
    async fn table_columns(&self, table: &str) -> StorageResult<Vec<ColumnInfo>>;
}

/// An in-memory schema, for building queries without a live database.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    tables: HashMap<String, Vec<ColumnInfo>>,
}

impl StaticSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a table.
    pub fn with_table(mut self, table: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        self.tables.insert(table.into(), columns);
        self
    }

    /// Returns the columns of `table`, or nothing if it is unknown.
    pub fn columns(&self, table: &str) -> Vec<ColumnInfo> {
        self.tables.get(table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl SchemaIntrospector for StaticSchema {
    async fn table_columns(&self, table: &str) -> StorageResult<Vec<ColumnInfo>> {
        Ok(self.columns(table))
    }
}
