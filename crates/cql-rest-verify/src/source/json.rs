//! Decoding REST API responses into rows.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::{RawValue, Row, Source};
use crate::error::{Result, VerifyError};

/// Body of a REST rows response: `{"count": 2, "rows": [{...}, {...}]}`.
#[derive(Debug, Deserialize)]
struct RowsResponse {
    #[serde(default)]
    count: Option<u64>,
    rows: Vec<Map<String, Value>>,
}

/// Parse a REST rows response into JSON-sourced rows.
pub fn parse_rest_rows(body: &str) -> Result<Vec<Row>> {
    let response: RowsResponse = serde_json::from_str(body)?;
    if let Some(count) = response.count {
        if count != response.rows.len() as u64 {
            warn!(
                "REST response count {} does not match {} rows returned",
                count,
                response.rows.len()
            );
        }
    }
    debug!("Parsed {} REST rows", response.rows.len());
    Ok(response.rows.iter().map(row_from_object).collect())
}

/// Convert an already-decoded response body into rows.
///
/// Accepts either the full `{"rows": [...]}` object or a bare array of row
/// objects.
pub fn rows_from_value(value: &Value) -> Result<Vec<Row>> {
    let rows = match value {
        Value::Object(body) => body.get("rows").and_then(Value::as_array).ok_or_else(|| {
            VerifyError::invalid_input("REST response object has no \"rows\" array")
        })?,
        Value::Array(rows) => rows,
        other => {
            return Err(VerifyError::invalid_input(format!(
                "expected REST rows, got {}",
                json_kind(other)
            )))
        }
    };

    rows.iter()
        .map(|row| match row {
            Value::Object(fields) => Ok(row_from_object(fields)),
            other => Err(VerifyError::invalid_input(format!(
                "expected a row object, got {}",
                json_kind(other)
            ))),
        })
        .collect()
}

/// Convert one JSON value into the raw value the REST side produced.
///
/// Integers that fit `i64` become `BigInt`; larger integers and fractions
/// become `Double`. Arrays become lists and objects keep their text keys.
pub fn from_json_value(value: &Value) -> RawValue {
    match value {
        Value::Null => RawValue::Null,
        Value::Bool(v) => RawValue::Boolean(*v),
        Value::Number(n) => match n.as_i64() {
            Some(v) => RawValue::BigInt(v),
            None => RawValue::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => RawValue::Text(s.clone()),
        Value::Array(items) => RawValue::List(items.iter().map(from_json_value).collect()),
        Value::Object(fields) => RawValue::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), from_json_value(v)))
                .collect(),
        ),
    }
}

fn row_from_object(fields: &Map<String, Value>) -> Row {
    fields
        .iter()
        .fold(Row::new(Source::Json), |row, (column, value)| {
            row.with(column.as_str(), from_json_value(value))
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
