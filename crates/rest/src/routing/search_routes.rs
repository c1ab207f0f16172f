//! Search route configuration.

use axum::{
    Router,
    routing::{get, post},
};
use moltrack_persistence::core::SearchProvider;

use crate::handlers;
use crate::state::AppState;

/// Creates all advanced search API routes.
///
/// # Routes
///
/// - `GET /health` - Backend health check
/// - `GET /_liveness` - Process liveness
/// - `POST /v1/search` - Search with the level in the body
/// - `POST /v1/search/{level}` - Search rooted at `compounds`, `batches`,
///   `assays`, `assay-runs` or `assay-results`
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: SearchProvider + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/v1/search", post(handlers::search_handler::<S>))
        .route("/v1/search/{level}", post(handlers::level_search_handler::<S>))
        .with_state(state)
}
