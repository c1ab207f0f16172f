//! # moltrack-rest - Advanced Search HTTP API
//!
//! This crate exposes the MolTrack advanced search engine over HTTP. A
//! search names a root level, the columns to return, an optional filter
//! tree, optional aggregations, and an output format; results come back as
//! a JSON envelope or as a CSV/Parquet attachment.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use moltrack_rest::{create_app_with_config, ServerConfig};
//! use moltrack_persistence::backends::postgres::PostgresBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = PostgresBackend::from_env().await?;
//!     let config = ServerConfig::default();
//!
//!     let app = create_app_with_config(backend, config);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Operation | HTTP Method | URL Pattern |
//! |-----------|-------------|-------------|
//! | search (level in URL) | POST | `/v1/search/{level}` |
//! | search (level in body) | POST | `/v1/search` |
//! | health | GET | `/health` |
//! | liveness | GET | `/_liveness` |
//!
//! `{level}` is one of `compounds`, `batches`, `assays`, `assay-runs`,
//! `assay-results`.
//!
//! ## Request Body
//!
//! ```json
//! {
//!   "output": ["compounds.details.corporate_compound_id", "compounds.canonical_smiles"],
//!   "filter": {
//!     "field": "assay_results.details.IC50",
//!     "operator": "<",
//!     "value": 5
//!   },
//!   "aggregations": [{"field": "assay_results.details.IC50", "operation": "AVG"}],
//!   "output_format": "json",
//!   "limit": 100
//! }
//! ```
//!
//! ## Error Handling
//!
//! Errors are returned as `{"status": "error", "detail": "..."}`:
//!
//! | HTTP Status | Description |
//! |-------------|-------------|
//! | 400 | Unknown field, operator, aggregation, or malformed filter |
//! | 404 | Unknown level in the URL |
//! | 422 | Body is not a JSON object |
//! | 500 | Database failure (detail withheld) |
//! | 503 | Health check failed |
//!
//! ## Architecture
//!
//! - [`error`] - Error types and error bodies
//! - [`config`] - Server configuration
//! - [`state`] - Application state (backend, configuration)
//! - [`handlers`] - HTTP request handlers
//! - [`responses`] - JSON, CSV and Parquet encoding
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod responses;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use moltrack_persistence::core::SearchProvider;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(storage: S) -> Router
where
    S: SearchProvider + Send + Sync + 'static,
{
    create_app_with_config(storage, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// # Arguments
///
/// * `storage` - The search backend to use
/// * `config` - Server configuration
///
/// # Example
///
/// ```rust,ignore
/// use moltrack_rest::{create_app_with_config, ServerConfig};
///
/// let config = ServerConfig {
///     max_search_limit: Some(5000),
///     enable_cors: false,
///     ..Default::default()
/// };
/// let app = create_app_with_config(backend, config);
/// ```
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> Router
where
    S: SearchProvider + Send + Sync + 'static,
{
    info!(
        "Creating search API server with backend: {}",
        storage.backend_name()
    );

    let state = AppState::new(Arc::new(storage), config.clone());

    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = router.layer(DefaultBodyLimit::max(config.max_body_size));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer from the configured origins.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level` when set.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "moltrack_rest={level},moltrack_persistence={level},moltrack_server={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
