//! Advanced search query engine.
//!
//! Compiles a [`SearchRequest`](crate::types::SearchRequest) into one
//! parameterized PostgreSQL statement over the registration schema:
//!
//! - [`table_config`] - per-level aliases, details tables and direct columns
//! - [`joins`] - ordered, de-duplicated join accumulation and level paths
//! - [`field_resolver`] - dotted field paths to column expressions and
//!   `EXISTS` scaffolding
//! - [`operators`] - comparison operators, value validation, qualifier logic
//! - [`aggregations`] - aggregate functions
//! - [`naming`] - output aliases and display labels
//! - [`query_builder`] - statement assembly and recursive filter lowering
//! - [`engine`] - per-request orchestration over a database session
//!
//! # Example
//!
//! ```
//! use moltrack_persistence::core::{ColumnInfo, StaticSchema};
//! use moltrack_persistence::search::{
//!     AliasMapping, FieldResolver, QueryBuilder, TableConfig, TableRegistry,
//! };
//! use moltrack_persistence::types::{FieldPath, Level, SearchRequest};
//!
//! let configs = Level::ALL
//!     .into_iter()
//!     .map(|level| {
//!         let columns = vec![ColumnInfo::new("id", "integer")];
//!         TableConfig::derive(level, &columns, &[])
//!     })
//!     .collect();
//! let resolver = FieldResolver::new(TableRegistry::from_configs("moltrack", configs));
//!
//! let request = SearchRequest::new(
//!     Level::Batches,
//!     vec![FieldPath::direct(Level::Batches, "id")],
//! )
//! .unwrap();
//! let mapping = AliasMapping::from_request(&request);
//! let query = QueryBuilder::new(&resolver).build_query(&request, &mapping).unwrap();
//!
//! assert!(query.sql.starts_with("WITH base AS (SELECT bb.id AS batches_id"));
//! ```

pub mod aggregations;
pub mod engine;
pub mod field_resolver;
pub mod joins;
pub mod naming;
pub mod operators;
pub mod query_builder;
pub mod sql;
pub mod table_config;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregations::AggregationCatalog;
pub use engine::execute_search;
pub use field_resolver::{
    DynamicField, FieldResolver, ResolveMode, ResolvedField, SearchLevelInfo, Subquery,
};
pub use joins::{JoinClause, JoinKind, JoinPlan, TableRef};
pub use naming::{AliasMapping, OutputColumn, sanitize_field_name};
pub use operators::{Operand, OperatorCatalog};
pub use query_builder::{BuiltQuery, QueryBuilder};
pub use sql::{SqlFragment, SqlParam};
pub use table_config::{ColumnType, DirectField, TableConfig, TableRegistry};
