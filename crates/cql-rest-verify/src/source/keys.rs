//! Primary key handling for REST row lookups.
//!
//! The REST API addresses rows by a `;`-joined list of key values: the full
//! partition key followed by any prefix of the clustering key.

use crate::core::{ColumnTypeLookup, Row, TableRef};
use crate::error::{Result, VerifyError};
use crate::verify::timestamp_rest_format;

/// Every valid key column list for a table: the partition key, then the
/// partition key extended by each clustering-key prefix.
///
/// A table with clustering key `(c1, c2)` yields three lists:
/// `pk`, `pk + c1` and `pk + c1 + c2`.
pub fn key_column_prefixes(partition_key: &[String], clustering_key: &[String]) -> Vec<Vec<String>> {
    (0..=clustering_key.len())
        .map(|n| {
            partition_key
                .iter()
                .chain(&clustering_key[..n])
                .cloned()
                .collect()
        })
        .collect()
}

/// Render a row's key values the way the REST path expects them.
///
/// Timestamp-typed key columns go through the REST timestamp format; other
/// values use their plain text form.
pub fn rest_key_values(
    row: &Row,
    key_columns: &[String],
    schema: &dyn ColumnTypeLookup,
    table: &TableRef,
) -> Result<Vec<String>> {
    key_columns
        .iter()
        .map(|column| -> Result<String> {
            let value = row.get(column).ok_or_else(|| {
                VerifyError::invalid_input(format!(
                    "key column {} missing from row of {}",
                    column, table
                ))
            })?;
            let text = value.to_string();
            match schema.column_type(table, column) {
                Some(tag) if tag.is_timestamp() => Ok(timestamp_rest_format(&text)),
                _ => Ok(text),
            }
        })
        .collect()
}

/// REST resource path for the rows matching a key.
#[must_use]
pub fn rows_by_key_resource(table: &TableRef, key_values: &[String]) -> String {
    format!(
        "/keyspaces/{}/tables/{}/rows/{}",
        table.keyspace,
        table.table,
        key_values.join(";")
    )
}
