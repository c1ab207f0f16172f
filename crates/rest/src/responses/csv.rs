//! CSV encoding of search results.

use moltrack_persistence::types::SearchResult;
use serde_json::Value;

use crate::error::{RestError, RestResult};

/// Encodes `result` as CSV with a header row of display column names.
///
/// Nulls become empty fields; arrays and objects are written as JSON text.
pub fn to_csv(result: &SearchResult) -> RestResult<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(&result.columns).map_err(csv_error)?;
    for row in &result.rows {
        writer
            .write_record(row.iter().map(cell_text))
            .map_err(csv_error)?;
    }

    writer.into_inner().map_err(|e| RestError::InternalError {
        message: format!("Failed to flush CSV output: {}", e),
    })
}

/// Renders one value as a text cell.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn csv_error(e: ::csv::Error) -> RestError {
    RestError::InternalError {
        message: format!("Failed to write CSV output: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moltrack_persistence::types::Level;
    use serde_json::json;

    #[test]
    fn test_csv_header_and_rows() {
        let result = SearchResult::new(
            Level::Compounds,
            vec!["compounds.id".to_string(), "compounds.details.name".to_string()],
        )
        .with_rows(vec![
            vec![json!(1), json!("aspirin, 325mg")],
            vec![json!(2), Value::Null],
        ]);

        let csv = String::from_utf8(to_csv(&result).unwrap()).unwrap();
        assert_eq!(
            csv,
            "compounds.id,compounds.details.name\n1,\"aspirin, 325mg\"\n2,\n"
        );
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(12.5)), "12.5");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&json!(["a", "b"])), r#"["a","b"]"#);
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[test]
    fn test_empty_result_has_header_only() {
        let result = SearchResult::new(Level::Batches, vec!["batches.id".to_string()]);
        let csv = String::from_utf8(to_csv(&result).unwrap()).unwrap();
        assert_eq!(csv, "batches.id\n");
    }
}
