//! Advanced search handlers.
//!
//! - `POST [base]/v1/search/{level}` - Search rooted at the level in the URL
//! - `POST [base]/v1/search` - Search rooted at the `level` named in the body
//!
//! The body is read as plain JSON first so that an unreadable body (422) can
//! be told apart from a well-formed request naming an unknown field,
//! operator, or aggregation (400).

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::Response,
};
use moltrack_persistence::core::SearchProvider;
use moltrack_persistence::types::{Level, SearchRequest};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{RestError, RestResult};
use crate::responses::format_search_response;
use crate::state::AppState;

/// Handler for level-scoped search.
///
/// The level comes from the URL segment (`compounds`, `batches`, `assays`,
/// `assay-runs`, `assay-results`). A `level` given in the body must agree
/// with it.
///
/// # HTTP Request
///
/// `POST [base]/v1/search/{level}`
///
/// # Response
///
/// - `200 OK` - JSON envelope, or a CSV/Parquet attachment
/// - `400 Bad Request` - Unknown field, operator, aggregation, or bad filter
/// - `404 Not Found` - Unknown level segment
/// - `422 Unprocessable Entity` - Body is not a JSON object
pub async fn level_search_handler<S>(
    State(state): State<AppState<S>>,
    Path(level): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<Response>
where
    S: SearchProvider + Send + Sync,
{
    let level: Level = level.parse().map_err(|_| RestError::NotFound {
        message: format!("unknown search level '{}'", level),
    })?;
    debug!(level = %level, "Processing level search request");

    let mut body = read_body(body)?;
    let Some(object) = body.as_object_mut() else {
        return Err(not_an_object());
    };

    if let Some(given) = object.get("level") {
        let agrees = given.as_str().and_then(|s| s.parse::<Level>().ok()) == Some(level);
        if !agrees {
            return Err(RestError::BadRequest {
                message: format!(
                    "request level {} does not match the '{}' endpoint",
                    given,
                    level.slug()
                ),
            });
        }
    }
    object.insert(
        "level".to_string(),
        Value::String(level.table_name().to_string()),
    );

    let request = parse_request(body)?;
    run_search(&state, request).await
}

/// Handler for search with the level in the body.
///
/// # HTTP Request
///
/// `POST [base]/v1/search`
///
/// # Response
///
/// Same as [`level_search_handler`], with a missing or unknown `level`
/// reported as `400 Bad Request`.
pub async fn search_handler<S>(
    State(state): State<AppState<S>>,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<Response>
where
    S: SearchProvider + Send + Sync,
{
    debug!("Processing search request");

    let body = read_body(body)?;
    if !body.is_object() {
        return Err(not_an_object());
    }

    let request = parse_request(body)?;
    run_search(&state, request).await
}

/// Applies the configured row cap, runs the search, and encodes the result.
async fn run_search<S>(state: &AppState<S>, request: SearchRequest) -> RestResult<Response>
where
    S: SearchProvider + Send + Sync,
{
    let request = match state.max_search_limit() {
        Some(max) => request.clamp_limit(max),
        None => request,
    };
    let format = request.output_format();

    let result = state.storage().search(&request).await?;

    info!(
        level = %result.level,
        rows = result.total_count(),
        format = format.extension(),
        "Search completed"
    );

    format_search_response(&result, format)
}

fn read_body(body: Result<Json<Value>, JsonRejection>) -> RestResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| RestError::UnprocessableEntity {
            message: rejection.body_text(),
        })
}

fn parse_request(body: Value) -> RestResult<SearchRequest> {
    serde_json::from_value(body).map_err(|e| RestError::BadRequest {
        message: e.to_string(),
    })
}

fn not_an_object() -> RestError {
    RestError::UnprocessableEntity {
        message: "request body must be a JSON object".to_string(),
    }
}
