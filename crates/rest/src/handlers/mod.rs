//! HTTP request handlers.
//!
//! - [`search`] - Advanced search, per level and with the level in the body
//! - [`health`] - Health check endpoint

pub mod health;
pub mod search;

// Re-export handlers for convenience
pub use health::{health_handler, liveness_handler};
pub use search::{level_search_handler, search_handler};
