//! PostgreSQL backend implementation.
//!
//! Connections come from a `deadpool-postgres` pool over `tokio-postgres`.
//! Each search checks out one connection, applies the configured
//! `statement_timeout`, and wraps it in a [`PostgresSession`] that
//! introspects the registration schema and executes the compiled statement.
//!
//! # Example
//!
//! ```no_run
//! use moltrack_persistence::backends::postgres::{PostgresBackend, PostgresConfig};
//! use moltrack_persistence::core::SearchProvider;
//! use moltrack_persistence::types::{FieldPath, Level, SearchRequest};
//!
//! # async fn main_example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = PostgresBackend::new(PostgresConfig::default()).await?;
//!
//! let request = SearchRequest::new(
//!     Level::Compounds,
//!     vec![FieldPath::direct(Level::Compounds, "canonical_smiles")],
//! )?;
//! let result = backend.search(&request).await?;
//! println!("{}", result.to_json());
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! Searches read the registration tables of the configured schema:
//! `compounds`, `batches`, `assays`, `assay_runs`, `assay_results`, their
//! `*_details` EAV tables and `properties`. Column types come from
//! `information_schema.columns`, so no schema is created or migrated here.

mod backend;
mod schema;
mod search_impl;

pub use backend::{PostgresBackend, PostgresConfig, PostgresSslMode};
pub use schema::PostgresSession;
