//! Request orchestration.
//!
//! [`execute_search`] runs one request end to end on a single session:
//! derive table configuration, validate fields, compile, execute, and label
//! the result columns for display.

use tracing::{debug, instrument};

use super::field_resolver::FieldResolver;
use super::naming::AliasMapping;
use super::query_builder::QueryBuilder;
use super::table_config::TableRegistry;
use crate::core::{SchemaIntrospector, StatementExecutor};
use crate::error::{BackendError, StorageResult, ValidationError};
use crate::types::{SearchRequest, SearchResult};

/// Executes `request` against the tables of `schema`.
///
/// Output fields must belong to the searched level; aggregation fields may
/// name any level. Filter fields are checked while the filter is compiled.
#[instrument(skip_all, fields(level = %request.level()))]
pub async fn execute_search<S>(
    session: &S,
    schema: &str,
    request: &SearchRequest,
) -> StorageResult<SearchResult>
where
    S: SchemaIntrospector + StatementExecutor + ?Sized,
{
    let registry = TableRegistry::load(session, schema).await?;
    let resolver = FieldResolver::new(registry);
    let level = request.level();

    for field in request.output() {
        let path = field.to_string();
        if !resolver.validate_field_path(&path, Some(level)) {
            return Err(ValidationError::InvalidFieldPath {
                path,
                message: format!("not a known field of {}", level),
            }
            .into());
        }
    }
    for aggregation in request.aggregations() {
        let path = aggregation.field.to_string();
        if !resolver.validate_field_path(&path, None) {
            return Err(ValidationError::InvalidFieldPath {
                path,
                message: "not a known field".to_string(),
            }
            .into());
        }
    }

    let mapping = AliasMapping::from_request(request);
    let built = QueryBuilder::new(&resolver).build_query(request, &mapping)?;
    debug!(sql = %built.sql, params = built.params.len(), "Executing search");

    let rows = session.query(&built.sql, &built.params).await?;
    if rows.columns.len() != built.columns.len() {
        return Err(BackendError::QueryError {
            message: format!(
                "expected {} result columns, got {}",
                built.columns.len(),
                rows.columns.len()
            ),
        }
        .into());
    }

    debug!(rows = rows.rows.len(), "Search completed");
    Ok(SearchResult::new(level, built.columns).with_rows(rows.rows))
}
