//! Core types for advanced search.
//!
//! - [`Level`] - the five searchable entity levels
//! - [`FieldPath`] - dotted `level.field` / `level.details.property` paths
//! - [`Filter`], [`AtomicCondition`], [`LogicalNode`] - recursive filter trees
//! - [`SearchRequest`], [`Aggregation`], [`OutputFormat`] - request shape
//! - [`ValueType`], [`ValueQualifier`] - dynamic property storage
//! - [`SearchResult`] - returned rows
//!
//! # Building a Request
//!
//! ```
//! use moltrack_persistence::types::{
//!     AtomicCondition, CompareOp, FieldPath, Filter, Level, SearchRequest,
//! };
//!
//! let filter = Filter::or(vec![
//!     AtomicCondition::compare(
//!         "compounds.details.corporate_compound_id".parse().unwrap(),
//!         CompareOp::Equals,
//!         "DG-000001",
//!     )
//!     .unwrap()
//!     .into(),
//!     AtomicCondition::compare(
//!         "batches.details.corporate_batch_id".parse().unwrap(),
//!         CompareOp::Equals,
//!         "DGB-000002",
//!     )
//!     .unwrap()
//!     .into(),
//! ])
//! .unwrap();
//!
//! let request = SearchRequest::new(
//!     Level::Compounds,
//!     vec![FieldPath::direct(Level::Compounds, "molregno")],
//! )
//! .unwrap()
//! .with_filter(filter)
//! .with_limit(50);
//!
//! assert_eq!(request.limit(), Some(50));
//! ```

mod field_path;
mod filter;
mod level;
mod property;
mod request;
mod result;

pub use field_path::{DETAILS_SEGMENT, FieldPath};
pub use filter::{AtomicCondition, CompareOp, Filter, LogicOp, LogicalNode, OperatorFamily};
pub use level::Level;
pub use property::{ValueQualifier, ValueType};
pub use request::{Aggregation, AggregationOp, OutputFormat, SearchRequest};
pub use result::SearchResult;
