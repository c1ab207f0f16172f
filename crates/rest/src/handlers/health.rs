//! Health check endpoint handler.
//!
//! Reports whether the search backend can currently serve requests.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use moltrack_persistence::core::SearchProvider;
use tracing::{debug, warn};

use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - Backend answered its health check
/// - `503 Service Unavailable` - Backend is unreachable
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: SearchProvider + Send + Sync,
{
    debug!("Processing health check request");

    let backend_name = state.storage().backend_name();
    state.storage().health_check().await.map_err(|e| {
        warn!(backend = backend_name, error = %e, "Health check failed");
        RestError::ServiceUnavailable {
            message: format!("{} backend is unavailable", backend_name),
        }
    })?;

    let health_response = serde_json::json!({
        "status": "healthy",
        "backend": backend_name,
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    Ok((StatusCode::OK, Json(health_response)).into_response())
}

/// Liveness probe handler.
///
/// Answers without touching the backend.
///
/// # HTTP Request
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "alive"})))
}
