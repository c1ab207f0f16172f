//! Parquet encoding of search results.
//!
//! Each output column becomes one nullable Arrow column. The Arrow type is
//! inferred from the values: `Int64`, `Float64` or `Boolean` when every
//! non-null value fits, `Utf8` otherwise.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use moltrack_persistence::types::SearchResult;
use parquet::arrow::ArrowWriter;
use serde_json::Value;

use super::csv::cell_text;
use crate::error::{RestError, RestResult};

/// Encodes `result` as a single-row-group Parquet file.
pub fn to_parquet(result: &SearchResult) -> RestResult<Vec<u8>> {
    let mut fields = Vec::with_capacity(result.columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(result.columns.len());

    for (idx, name) in result.columns.iter().enumerate() {
        let values: Vec<&Value> = result
            .rows
            .iter()
            .map(|row| row.get(idx).unwrap_or(&Value::Null))
            .collect();
        let data_type = infer_type(&values);
        arrays.push(build_array(&data_type, &values));
        fields.push(Field::new(name, data_type, true));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).map_err(|e| {
        RestError::InternalError {
            message: format!("Failed to build record batch: {}", e),
        }
    })?;

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).map_err(parquet_error)?;
    writer.write(&batch).map_err(parquet_error)?;
    writer.close().map_err(parquet_error)?;

    Ok(buffer)
}

/// Picks the narrowest Arrow type holding every non-null value.
pub(crate) fn infer_type(values: &[&Value]) -> DataType {
    let present: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();
    if present.is_empty() {
        return DataType::Utf8;
    }
    if present.iter().all(|v| v.is_i64()) {
        DataType::Int64
    } else if present.iter().all(|v| v.is_number()) {
        DataType::Float64
    } else if present.iter().all(|v| v.is_boolean()) {
        DataType::Boolean
    } else {
        DataType::Utf8
    }
}

fn build_array(data_type: &DataType, values: &[&Value]) -> ArrayRef {
    match data_type {
        DataType::Int64 => Arc::new(values.iter().map(|v| v.as_i64()).collect::<Int64Array>()),
        DataType::Float64 => {
            Arc::new(values.iter().map(|v| v.as_f64()).collect::<Float64Array>())
        }
        DataType::Boolean => {
            Arc::new(values.iter().map(|v| v.as_bool()).collect::<BooleanArray>())
        }
        _ => Arc::new(
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| cell_text(v)))
                .collect::<StringArray>(),
        ),
    }
}

fn parquet_error(e: parquet::errors::ParquetError) -> RestError {
    RestError::InternalError {
        message: format!("Failed to write Parquet output: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use moltrack_persistence::types::Level;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use serde_json::json;

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type(&[&json!(1), &Value::Null]), DataType::Int64);
        assert_eq!(infer_type(&[&json!(1), &json!(2.5)]), DataType::Float64);
        assert_eq!(infer_type(&[&json!(true), &json!(false)]), DataType::Boolean);
        assert_eq!(infer_type(&[&json!(1), &json!("<5")]), DataType::Utf8);
        assert_eq!(infer_type(&[&Value::Null]), DataType::Utf8);
    }

    #[test]
    fn test_parquet_schema_and_rows() {
        let result = SearchResult::new(
            Level::AssayResults,
            vec![
                "assay_results.id".to_string(),
                "assay_results.details.IC50".to_string(),
                "AVG(assay_results.details.clearance)".to_string(),
            ],
        )
        .with_rows(vec![
            vec![json!(101), json!("<50"), json!(12.5)],
            vec![json!(102), json!("8"), Value::Null],
        ]);

        let bytes = to_parquet(&result).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);

        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        let schema = batch.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);
        assert_eq!(schema.field(2).name(), "AVG(assay_results.details.clearance)");
        assert_eq!(batch.column(2).null_count(), 1);
    }
}
