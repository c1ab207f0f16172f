//! Per-request PostgreSQL session: schema introspection, statement execution
//! and row decoding.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Number, Value};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql, Type};
use uuid::Uuid;

use crate::core::{ColumnInfo, QueryRows, SchemaIntrospector, StatementExecutor};
use crate::error::{BackendError, StorageError, StorageResult};
use crate::search::SqlParam;

// information_schema columns are domain types, so everything crosses as text.
const COLUMNS_SQL: &str = "SELECT column_name::text, data_type::text, udt_name::text \
     FROM information_schema.columns \
     WHERE table_schema::text = $1::text AND table_name::text = $2::text \
     ORDER BY ordinal_position";

fn query_error(e: tokio_postgres::Error) -> StorageError {
    StorageError::Backend(BackendError::QueryError {
        message: e.to_string(),
    })
}

/// A pooled connection bound to one schema.
pub struct PostgresSession {
    client: deadpool_postgres::Client,
    schema: String,
}

impl PostgresSession {
    pub(crate) fn new(client: deadpool_postgres::Client, schema: String) -> Self {
        Self { client, schema }
    }

    /// The schema whose tables are introspected.
    pub fn schema(&self) -> &str {
        &self.schema
    }
}

#[async_trait]
impl SchemaIntrospector for PostgresSession {
    async fn table_columns(&self, table: &str) -> StorageResult<Vec<ColumnInfo>> {
        let rows = self
            .client
            .query(COLUMNS_SQL, &[&self.schema, &table])
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get(0).map_err(query_error)?;
                let data_type: String = row.try_get(1).map_err(query_error)?;
                let udt_name: String = row.try_get(2).map_err(query_error)?;
                Ok(ColumnInfo::new(name, data_type).with_udt(udt_name))
            })
            .collect()
    }
}

#[async_trait]
impl StatementExecutor for PostgresSession {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> StorageResult<QueryRows> {
        // Every placeholder is rendered as `$N::text`, so parameters bind as text.
        let texts: Vec<Option<String>> = params.iter().map(SqlParam::to_text).collect();
        let param_refs: Vec<&(dyn ToSql + Sync)> = texts
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect();

        let statement = self.client.prepare(sql).await.map_err(query_error)?;
        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let rows = self
            .client
            .query(&statement, &param_refs)
            .await
            .map_err(query_error)?;

        let rows = rows.iter().map(decode_row).collect::<StorageResult<_>>()?;
        Ok(QueryRows { columns, rows })
    }
}

/// Decodes every column of `row` into JSON.
fn decode_row(row: &Row) -> StorageResult<Vec<Value>> {
    (0..row.len()).map(|idx| decode_value(row, idx)).collect()
}

fn decode_value(row: &Row, idx: usize) -> StorageResult<Value> {
    let value = match *row.columns()[idx].type_() {
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::INT2 => get::<i16>(row, idx)?.map(Value::from),
        Type::INT4 => get::<i32>(row, idx)?.map(Value::from),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::from),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(|f| float(f64::from(f))),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(float),
        Type::NUMERIC => get::<Decimal>(row, idx)?.map(decimal),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, idx)?.map(Value::String)
        }
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?.map(timestamptz),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?.map(timestamp),
        Type::DATE => get::<NaiveDate>(row, idx)?.map(|d| Value::String(d.to_string())),
        Type::TIME => get::<NaiveTime>(row, idx)?.map(|t| Value::String(t.to_string())),
        Type::UUID => get::<Uuid>(row, idx)?.map(|u| Value::String(u.to_string())),
        Type::JSON | Type::JSONB => get::<Value>(row, idx)?,
        Type::BOOL_ARRAY => array::<bool>(row, idx, Value::Bool)?,
        Type::INT2_ARRAY => array::<i16>(row, idx, Value::from)?,
        Type::INT4_ARRAY => array::<i32>(row, idx, Value::from)?,
        Type::INT8_ARRAY => array::<i64>(row, idx, Value::from)?,
        Type::FLOAT4_ARRAY => array::<f32>(row, idx, |f| float(f64::from(f)))?,
        Type::FLOAT8_ARRAY => array::<f64>(row, idx, float)?,
        Type::NUMERIC_ARRAY => array::<Decimal>(row, idx, decimal)?,
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::BPCHAR_ARRAY | Type::NAME_ARRAY => {
            array::<String>(row, idx, Value::String)?
        }
        Type::TIMESTAMPTZ_ARRAY => array::<DateTime<Utc>>(row, idx, timestamptz)?,
        Type::TIMESTAMP_ARRAY => array::<NaiveDateTime>(row, idx, timestamp)?,
        Type::DATE_ARRAY => array::<NaiveDate>(row, idx, |d| Value::String(d.to_string()))?,
        Type::UUID_ARRAY => array::<Uuid>(row, idx, |u| Value::String(u.to_string()))?,
        Type::JSON_ARRAY | Type::JSONB_ARRAY => array::<Value>(row, idx, |v| v)?,
        _ => None,
    };
    Ok(value.unwrap_or(Value::Null))
}

fn get<'a, T>(row: &'a Row, idx: usize) -> StorageResult<Option<T>>
where
    T: FromSql<'a>,
{
    row.try_get::<_, Option<T>>(idx).map_err(|e| {
        StorageError::Backend(BackendError::SerializationError {
            message: format!("column {}: {}", row.columns()[idx].name(), e),
        })
    })
}

fn array<'a, T>(
    row: &'a Row,
    idx: usize,
    convert: impl Fn(T) -> Value,
) -> StorageResult<Option<Value>>
where
    T: FromSql<'a>,
{
    Ok(get::<Vec<Option<T>>>(row, idx)?.map(|items| {
        Value::Array(
            items
                .into_iter()
                .map(|item| item.map(&convert).unwrap_or(Value::Null))
                .collect(),
        )
    }))
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn decimal(d: Decimal) -> Value {
    if d.fract().is_zero() {
        if let Some(i) = d.to_i64() {
            return Value::from(i);
        }
    }
    d.to_f64().map(float).unwrap_or(Value::Null)
}

fn timestamptz(ts: DateTime<Utc>) -> Value {
    Value::String(ts.to_rfc3339())
}

fn timestamp(ts: NaiveDateTime) -> Value {
    Value::String(ts.and_utc().to_rfc3339())
}
