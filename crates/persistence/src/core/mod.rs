//! Core search traits.
//!
//! The query engine talks to the database only through these traits:
//!
//! - [`SchemaIntrospector`] - column metadata used to derive table configuration
//! - [`StatementExecutor`] - runs the assembled statement
//! - [`SearchProvider`] - the end-to-end search entry point exposed to callers
//!
//! Backends implement the first two for a single connection and the last for
//! their pool.

mod executor;
mod schema;
mod search;

pub use executor::{QueryRows, StatementExecutor};
pub use schema::{ColumnInfo, SchemaIntrospector, StaticSchema};
pub use search::SearchProvider;
