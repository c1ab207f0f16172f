//! MolTrack Advanced Search Persistence Layer
//!
//! This crate compiles structured search requests over the chemical
//! registration schema (compounds, batches, assays, assay runs and assay
//! results, each with an EAV `*_details` table of dynamic properties) into a
//! single parameterized PostgreSQL statement, and runs it.
//!
//! # Features
//!
//! - **Dotted field paths**: `compounds.canonical_smiles`,
//!   `assay_results.details.IC50`, resolved against live column metadata
//! - **Recursive filters**: `AND`/`OR` trees of comparisons, with
//!   cross-level conditions lowered to correlated `EXISTS` subqueries
//! - **Qualifier-aware comparisons**: measurements stored as `<`/`>` bounds
//!   compare correctly
//! - **Chemistry operators**: similarity and substructure search through the
//!   RDKit cartridge
//! - **Aggregations**: per-property `FILTER`-scoped aggregates across levels
//!
//! # Backend Features
//!
//! - `postgres` (default) - PostgreSQL backend over `deadpool-postgres`
//! - `integration` - Docker-backed integration tests
//!
//! # Architecture
//!
//! - [`types`] - Levels, field paths, filters, requests and results
//! - [`error`] - Error types for all operations
//! - [`core`] - Schema introspection, statement execution and search traits
//! - [`search`] - The query engine
//! - [`backends`] - Backend implementations
//!
//! # Quick Start
//!
//! ```
//! use moltrack_persistence::types::{
//!     Aggregation, AggregationOp, AtomicCondition, CompareOp, FieldPath, Level, SearchRequest,
//! };
//!
//! let condition = AtomicCondition::compare(
//!     "assay_results.details.IC50".parse().unwrap(),
//!     CompareOp::LessThan,
//!     5,
//! )
//! .unwrap();
//!
//! let request = SearchRequest::new(
//!     Level::Compounds,
//!     vec![FieldPath::direct(Level::Compounds, "canonical_smiles")],
//! )
//! .unwrap()
//! .with_filter(condition.into())
//! .with_aggregations(vec![Aggregation::new(
//!     "assay_results.details.IC50".parse().unwrap(),
//!     AggregationOp::Min,
//! )])
//! .with_limit(50);
//!
//! assert_eq!(request.level(), Level::Compounds);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod search;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{StorageError, StorageResult};
pub use types::{Filter, Level, SearchRequest, SearchResult};

// Re-export core traits
pub use core::{SchemaIntrospector, SearchProvider, StatementExecutor};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
