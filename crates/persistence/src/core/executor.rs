//! Statement execution.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;
use crate::search::SqlParam;

/// Column names and decoded rows returned by a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRows {
    /// Column names as returned by the database.
    pub columns: Vec<String>,
    /// Row values, positionally aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

/// Executes parameterized SQL.
///
/// `params[i]` binds placeholder `$i+1`.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Runs a read-only statement and returns every row.
    async fn query(&self, sql: &str, params: &[SqlParam]) -> StorageResult<QueryRows>;
}
