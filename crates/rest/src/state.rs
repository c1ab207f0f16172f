//! Application state for the advanced search API.
//!
//! This module defines the shared application state that is available to all
//! request handlers: the search backend and the server configuration.

use std::sync::Arc;

use moltrack_persistence::core::SearchProvider;

use crate::config::ServerConfig;

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `S` - The search backend type (must implement [`SearchProvider`])
///
/// # Example
///
/// ```rust,ignore
/// use moltrack_rest::{AppState, ServerConfig};
/// use moltrack_persistence::backends::postgres::PostgresBackend;
/// use std::sync::Arc;
///
/// let backend = PostgresBackend::from_env().await?;
/// let state = AppState::new(Arc::new(backend), ServerConfig::default());
/// ```
pub struct AppState<S> {
    /// The search backend.
    storage: Arc<S>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// Manually implement Clone since S is wrapped in Arc and doesn't need to be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: SearchProvider> AppState<S> {
    /// Creates a new AppState with the given backend and configuration.
    pub fn new(storage: Arc<S>, config: ServerConfig) -> Self {
        Self {
            storage,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the search backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the configured upper bound on returned rows.
    pub fn max_search_limit(&self) -> Option<u64> {
        self.config.max_search_limit
    }
}
