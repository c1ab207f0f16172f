//! Response formatting for the advanced search API.
//!
//! - [`format`] - dispatch on the requested output format
//! - [`csv`] - CSV attachments
//! - [`parquet`] - Parquet attachments

pub mod csv;
pub mod format;
pub mod parquet;

pub use format::format_search_response;
