//! HTTP-level tests for the advanced search API.
//!
//! Runs the full router against an in-memory provider that echoes the
//! requested columns, covering:
//! - Level routing and level/body agreement
//! - JSON envelope, CSV and Parquet attachments
//! - Error statuses and bodies (400, 404, 422, 500, 503)
//! - Row limit clamping

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{StatusCode, header};
use axum_test::TestServer;
use moltrack_persistence::core::SearchProvider;
use moltrack_persistence::error::{BackendError, SearchError, StorageError, StorageResult};
use moltrack_persistence::types::{Level, SearchRequest, SearchResult};
use moltrack_rest::error::INTERNAL_DETAIL;
use moltrack_rest::{AppState, ServerConfig};
use serde_json::{Value, json};

#[derive(Clone, Copy, PartialEq)]
enum Behavior {
    Rows,
    UnknownField,
    DatabaseDown,
}

/// Provider that records every request and answers with one row per
/// requested column.
struct EchoProvider {
    behavior: Behavior,
    seen: Arc<Mutex<Vec<SearchRequest>>>,
}

#[async_trait]
impl SearchProvider for EchoProvider {
    async fn search(&self, request: &SearchRequest) -> StorageResult<SearchResult> {
        self.seen.lock().unwrap().push(request.clone());

        match self.behavior {
            Behavior::Rows => {
                let columns: Vec<String> = request.output().iter().map(|f| f.to_string()).collect();
                let rows = vec![
                    vec![json!(1), json!("CCO")],
                    vec![json!(2), Value::Null],
                ];
                Ok(SearchResult::new(request.level(), columns).with_rows(rows))
            }
            Behavior::UnknownField => Err(StorageError::Search(SearchError::FieldResolution {
                field: "compounds.details.color".to_string(),
                message: "unknown property 'color'".to_string(),
            })),
            Behavior::DatabaseDown => Err(BackendError::ConnectionFailed {
                backend_name: "postgres".to_string(),
                message: "password authentication failed for user \"moltrack\"".to_string(),
            }
            .into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "echo"
    }

    async fn health_check(&self) -> StorageResult<()> {
        if self.behavior == Behavior::DatabaseDown {
            return Err(BackendError::ConnectionFailed {
                backend_name: "postgres".to_string(),
                message: "connection refused".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn create_server_with(
    behavior: Behavior,
    config: ServerConfig,
) -> (TestServer, Arc<Mutex<Vec<SearchRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let provider = EchoProvider {
        behavior,
        seen: Arc::clone(&seen),
    };
    let state = AppState::new(Arc::new(provider), config);
    let app = moltrack_rest::routing::create_routes(state);
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, seen)
}

fn create_server(behavior: Behavior) -> (TestServer, Arc<Mutex<Vec<SearchRequest>>>) {
    create_server_with(behavior, ServerConfig::for_testing())
}

fn compound_body() -> Value {
    json!({
        "output": ["compounds.molregno", "compounds.canonical_smiles"],
        "filter": {
            "field": "compounds.details.corporate_compound_id",
            "operator": "=",
            "value": "DG-000001"
        }
    })
}

// ============================================================================
// JSON Results
// ============================================================================

#[tokio::test]
async fn test_level_search_returns_json_envelope() {
    let (server, seen) = create_server(Behavior::Rows);

    let response = server.post("/v1/search/compounds").json(&compound_body()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["level"], "compounds");
    assert_eq!(body["total_count"], 2);
    assert_eq!(
        body["columns"],
        json!(["compounds.molregno", "compounds.canonical_smiles"])
    );
    assert_eq!(body["data"][0]["compounds.canonical_smiles"], "CCO");
    assert_eq!(body["data"][1]["compounds.canonical_smiles"], Value::Null);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].level(), Level::Compounds);
    assert!(seen[0].filter().is_some());
}

#[tokio::test]
async fn test_hyphenated_level_segment() {
    let (server, seen) = create_server(Behavior::Rows);

    let response = server
        .post("/v1/search/assay-results")
        .json(&json!({"output": ["assay_results.id", "assay_results.details.IC50"]}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["level"], "assay_results");
    assert_eq!(seen.lock().unwrap()[0].level(), Level::AssayResults);
}

#[tokio::test]
async fn test_level_in_body() {
    let (server, seen) = create_server(Behavior::Rows);

    let mut body = compound_body();
    body["level"] = json!("batches");
    body["output"] = json!(["batches.id", "batches.details.corporate_batch_id"]);

    let response = server.post("/v1/search").json(&body).await;

    response.assert_status_ok();
    assert_eq!(seen.lock().unwrap()[0].level(), Level::Batches);
}

#[tokio::test]
async fn test_matching_body_level_is_accepted() {
    let (server, _) = create_server(Behavior::Rows);

    let mut body = compound_body();
    body["level"] = json!("compounds");

    let response = server.post("/v1/search/compounds").json(&body).await;
    response.assert_status_ok();
}

// ============================================================================
// File Results
// ============================================================================

#[tokio::test]
async fn test_csv_attachment() {
    let (server, _) = create_server(Behavior::Rows);

    let mut body = compound_body();
    body["output_format"] = json!("csv");

    let response = server.post("/v1/search/compounds").json(&body).await;

    response.assert_status_ok();
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=compounds_search.csv"
    );
    assert_eq!(
        response.text(),
        "compounds.molregno,compounds.canonical_smiles\n1,CCO\n2,\n"
    );
}

#[tokio::test]
async fn test_parquet_attachment() {
    let (server, _) = create_server(Behavior::Rows);

    let response = server
        .post("/v1/search/assay-runs")
        .json(&json!({
            "output": ["assay_runs.id", "assay_runs.details.operator"],
            "output_format": "parquet"
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/vnd.apache.parquet"
    );
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=assay_runs_search.parquet"
    );
    assert!(response.as_bytes().starts_with(b"PAR1"));
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_unknown_operator_is_bad_request() {
    let (server, seen) = create_server(Behavior::Rows);

    let response = server
        .post("/v1/search/compounds")
        .json(&json!({
            "output": ["compounds.molregno"],
            "filter": {"field": "compounds.molregno", "operator": "ABOUT", "value": 1}
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert!(body["detail"].as_str().unwrap().contains("ABOUT"));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_aggregation_is_bad_request() {
    let (server, _) = create_server(Behavior::Rows);

    let response = server
        .post("/v1/search/compounds")
        .json(&json!({
            "output": ["compounds.molregno", "assay_results.details.IC50"],
            "aggregations": [{"field": "assay_results.details.IC50", "operation": "GEOMEAN"}]
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("GEOMEAN"));
}

#[tokio::test]
async fn test_unresolvable_field_is_bad_request() {
    let (server, _) = create_server(Behavior::UnknownField);

    let response = server.post("/v1/search/compounds").json(&compound_body()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("compounds.details.color")
    );
}

#[tokio::test]
async fn test_mismatched_body_level_is_bad_request() {
    let (server, seen) = create_server(Behavior::Rows);

    let mut body = compound_body();
    body["level"] = json!("batches");

    let response = server.post("/v1/search/compounds").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_level_is_bad_request() {
    let (server, _) = create_server(Behavior::Rows);

    let response = server.post("/v1/search").json(&compound_body()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("level"));
}

#[tokio::test]
async fn test_unknown_level_segment_is_not_found() {
    let (server, _) = create_server(Behavior::Rows);

    let response = server.post("/v1/search/proteins").json(&compound_body()).await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("proteins"));
}

#[tokio::test]
async fn test_non_json_body_is_unprocessable() {
    let (server, _) = create_server(Behavior::Rows);

    let response = server
        .post("/v1/search/compounds")
        .text("output=compounds.molregno")
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_array_body_is_unprocessable() {
    let (server, _) = create_server(Behavior::Rows);

    let response = server
        .post("/v1/search/compounds")
        .json(&json!(["compounds.molregno"]))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_backend_failure_hides_cause() {
    let (server, _) = create_server(Behavior::DatabaseDown);

    let response = server.post("/v1/search/compounds").json(&compound_body()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["detail"], INTERNAL_DETAIL);
    assert!(!response.text().contains("password"));
}

// ============================================================================
// Limits
// ============================================================================

#[tokio::test]
async fn test_limit_is_clamped_to_configured_maximum() {
    let config = ServerConfig {
        max_search_limit: Some(100),
        ..ServerConfig::for_testing()
    };
    let (server, seen) = create_server_with(Behavior::Rows, config);

    let mut body = compound_body();
    body["limit"] = json!(5000);
    server.post("/v1/search/compounds").json(&body).await.assert_status_ok();

    server
        .post("/v1/search/compounds")
        .json(&compound_body())
        .await
        .assert_status_ok();

    let mut body = compound_body();
    body["limit"] = json!(10);
    server.post("/v1/search/compounds").json(&body).await.assert_status_ok();

    let limits: Vec<_> = seen.lock().unwrap().iter().map(|r| r.limit()).collect();
    assert_eq!(limits, vec![Some(100), Some(100), Some(10)]);
}

#[tokio::test]
async fn test_limit_is_untouched_without_maximum() {
    let (server, seen) = create_server(Behavior::Rows);

    let mut body = compound_body();
    body["limit"] = json!(5000);
    server.post("/v1/search/compounds").json(&body).await.assert_status_ok();

    assert_eq!(seen.lock().unwrap()[0].limit(), Some(5000));
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_backend() {
    let (server, _) = create_server(Behavior::Rows);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "echo");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_unavailable_when_backend_down() {
    let (server, _) = create_server(Behavior::DatabaseDown);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_liveness_ignores_backend() {
    let (server, _) = create_server(Behavior::DatabaseDown);

    server.get("/_liveness").await.assert_status_ok();
}
