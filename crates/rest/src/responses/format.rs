//! Output format dispatch.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use moltrack_persistence::types::{OutputFormat, SearchResult};

use super::csv::to_csv;
use super::parquet::to_parquet;
use crate::error::RestResult;

/// MIME type of CSV attachments.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// MIME type of Parquet attachments.
pub const PARQUET_CONTENT_TYPE: &str = "application/vnd.apache.parquet";

/// Renders `result` in the requested output format.
///
/// JSON results are returned inline; CSV and Parquet are returned as
/// attachments named `<level>_search.<ext>`.
pub fn format_search_response(result: &SearchResult, format: OutputFormat) -> RestResult<Response> {
    let (body, content_type) = match format {
        OutputFormat::Json => {
            return Ok((StatusCode::OK, Json(result.to_json())).into_response());
        }
        OutputFormat::Csv => (to_csv(result)?, CSV_CONTENT_TYPE),
        OutputFormat::Parquet => (to_parquet(result)?, PARQUET_CONTENT_TYPE),
    };

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(value) = HeaderValue::from_str(&content_disposition(result, format)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

/// Returns the `Content-Disposition` value for a file attachment.
pub fn content_disposition(result: &SearchResult, format: OutputFormat) -> String {
    format!(
        "attachment; filename={}_search.{}",
        result.level.table_name(),
        format.extension()
    )
}
