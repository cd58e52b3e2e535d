//! Row verification between CQL driver results and REST API results.
//!
//! A table is verified in three steps:
//!
//! - **Tables**: skipped tables (system keyspaces, the skip list) are reported
//!   without comparing anything
//! - **Rows**: row counts are checked, then rows are paired by position
//! - **Columns**: each shared column is classified by its declared type, and
//!   compared through [`compare::compare`] unless the ignore policy skips it
//!
//! Differences are collected rather than returned early, so one run reports
//! every mismatching column of every row.

pub mod compare;
pub mod flatten;
pub mod normalize;
pub mod types;

// Re-exports
pub use compare::{compare, strip_trailing_zeros, ComparisonOutcome};
pub use flatten::{flatten, flatten_object};
pub use normalize::{normalize, round_places, timestamp_rest_format, FLOAT_DECIMAL_PLACES};
pub use types::{
    ColumnMismatch, ColumnSetMismatch, IgnoredColumn, RowVerifyResult, TableVerifyResult,
    VerifyResult,
};

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::{ColumnTypeLookup, Row, Source, TableRef};
use crate::error::{Result, VerifyError};
use crate::source::TableFilter;
use crate::typemap::IgnorePolicy;

/// Compares CQL rows with REST rows under an ignore policy.
#[derive(Debug, Clone, Default)]
pub struct RowVerifier {
    policy: IgnorePolicy,
    filter: TableFilter,
}

impl RowVerifier {
    /// Create a verifier with the given ignore policy and default table filter.
    pub fn new(policy: IgnorePolicy) -> Self {
        Self {
            policy,
            filter: TableFilter::default(),
        }
    }

    /// Create a verifier from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: config.ignore_policy(),
            filter: config.tables.clone(),
        }
    }

    /// Replace the table filter.
    pub fn with_table_filter(mut self, filter: TableFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The ignore policy in use.
    pub fn policy(&self) -> &IgnorePolicy {
        &self.policy
    }

    /// The table filter in use.
    pub fn table_filter(&self) -> &TableFilter {
        &self.filter
    }

    /// Verify every row of a table.
    ///
    /// Rows are paired by position; callers fetch both sides with the same
    /// key restriction so the orders agree. When the row counts differ the
    /// pairing is meaningless, so only the count mismatch is reported.
    pub fn verify_rows(
        &self,
        table: &TableRef,
        cql_rows: &[Row],
        rest_rows: &[Row],
        schema: &dyn ColumnTypeLookup,
    ) -> Result<TableVerifyResult> {
        let start = Instant::now();

        if let Some(reason) = self.filter.skip_reason(table) {
            info!("Skipping table {}: {}", table, reason);
            return Ok(TableVerifyResult::skipped(table, reason));
        }

        let mut result = TableVerifyResult::new(table, cql_rows.len(), rest_rows.len());
        if result.row_count_mismatch() {
            warn!(
                "Table {} row count differs: CQL {} rows, REST {} rows",
                table,
                cql_rows.len(),
                rest_rows.len()
            );
            result.duration_ms = start.elapsed().as_millis() as u64;
            return Ok(result);
        }

        for (row_index, (cql_row, rest_row)) in cql_rows.iter().zip(rest_rows).enumerate() {
            let row = self.verify_row(table, row_index, cql_row, rest_row, schema)?;
            result.add_row(row);
        }

        result.duration_ms = start.elapsed().as_millis() as u64;

        if result.is_in_sync() {
            info!(
                "Table {} in sync: {} rows, {} columns compared",
                table, result.rows_compared, result.columns_compared
            );
        } else {
            warn!(
                "Table {} has {} differences in {}/{} rows",
                table,
                result.difference_count(),
                result.rows_mismatched,
                result.rows_compared
            );
        }

        Ok(result)
    }

    /// Verify one CQL row against one REST row.
    ///
    /// A column set mismatch is recorded, and the columns both rows share are
    /// still compared. Rows handed in on the wrong side are rejected.
    pub fn verify_row(
        &self,
        table: &TableRef,
        row_index: usize,
        cql_row: &Row,
        rest_row: &Row,
        schema: &dyn ColumnTypeLookup,
    ) -> Result<RowVerifyResult> {
        expect_source(table, row_index, cql_row, Source::Typed)?;
        expect_source(table, row_index, rest_row, Source::Json)?;

        let mut result = RowVerifyResult::new(row_index);

        let cql_columns = cql_row.column_names();
        let rest_columns = rest_row.column_names();
        if cql_columns != rest_columns {
            let mismatch = ColumnSetMismatch {
                row_index,
                cql_only: cql_columns
                    .difference(&rest_columns)
                    .map(|c| c.to_string())
                    .collect(),
                rest_only: rest_columns
                    .difference(&cql_columns)
                    .map(|c| c.to_string())
                    .collect(),
            };
            warn!(
                "Row {} of {} has different columns: CQL only {:?}, REST only {:?}",
                row_index, table, mismatch.cql_only, mismatch.rest_only
            );
            result.column_set_mismatch = Some(mismatch);
        }

        for column in cql_columns.intersection(&rest_columns) {
            let (Some(cql_value), Some(rest_value)) = (cql_row.get(column), rest_row.get(column))
            else {
                continue;
            };

            let column_type = schema.column_type(table, column);
            if let Some(tag) = column_type {
                if let Some(rule) = self.policy.matching_rule(tag).filter(|r| r.ignore) {
                    info!(
                        "Ignoring column {} ({}) of {}: {}",
                        column,
                        tag,
                        table,
                        rule.reason.as_deref().unwrap_or("matched ignore rule")
                    );
                    result.ignored.push(IgnoredColumn {
                        column: column.to_string(),
                        column_type: tag.to_string(),
                        reason: rule.reason.clone(),
                    });
                    continue;
                }
            } else {
                debug!("No declared type for column {} of {}", column, table);
            }

            let outcome = compare(cql_value, rest_value, column_type)?;
            result.columns_compared += 1;
            if !outcome.equal {
                let mismatch = ColumnMismatch {
                    row_index,
                    column: column.to_string(),
                    column_type: column_type.map(|t| t.to_string()),
                    explanation: outcome.explanation.unwrap_or_default(),
                };
                warn!("Table {}: {}", table, mismatch);
                result.mismatches.push(mismatch);
            }
        }

        Ok(result)
    }
}

fn expect_source(table: &TableRef, row_index: usize, row: &Row, expected: Source) -> Result<()> {
    if row.source == expected {
        return Ok(());
    }
    Err(VerifyError::invalid_input(format!(
        "row {} of {} passed as {} came from {}",
        row_index, table, expected, row.source
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnTypeTag, RawValue, TableSchema};
    use std::str::FromStr;

    fn tag(s: &str) -> ColumnTypeTag {
        ColumnTypeTag::parse(s).unwrap()
    }

    fn schema() -> TableSchema {
        TableSchema::new("ks", "t")
            .with_column("id", tag("int"))
            .with_column("name", tag("text"))
            .with_column("payload", tag("blob"))
            .with_column("score", tag("double"))
    }

    fn cql_row(id: i32, name: &str) -> Row {
        Row::new(Source::Typed)
            .with("id", id)
            .with("name", name)
            .with("payload", vec![0xde_u8, 0xad])
            .with("score", 1.5_f64)
    }

    fn rest_row(id: i64, name: &str) -> Row {
        Row::new(Source::Json)
            .with("id", id)
            .with("name", name)
            .with("payload", "3q0=")
            .with("score", 1.5_f64)
    }

    #[test]
    fn test_rows_in_sync() {
        let verifier = RowVerifier::default();
        let table = TableRef::new("ks", "t");
        let result = verifier
            .verify_rows(
                &table,
                &[cql_row(1, "a"), cql_row(2, "b")],
                &[rest_row(1, "a"), rest_row(2, "b")],
                &schema(),
            )
            .unwrap();

        assert!(result.is_in_sync());
        assert_eq!(result.rows_compared, 2);
        assert_eq!(result.columns_compared, 6);
        assert_eq!(result.ignored_columns.len(), 1);
        assert_eq!(result.ignored_columns[0].column, "payload");
    }

    #[test]
    fn test_value_mismatch_reported() {
        let verifier = RowVerifier::default();
        let table = TableRef::new("ks", "t");
        let result = verifier
            .verify_rows(&table, &[cql_row(1, "a")], &[rest_row(1, "b")], &schema())
            .unwrap();

        assert!(!result.is_in_sync());
        assert_eq!(result.column_mismatches.len(), 1);
        let mismatch = &result.column_mismatches[0];
        assert_eq!(mismatch.column, "name");
        assert_eq!(mismatch.column_type.as_deref(), Some("text"));
        assert!(mismatch.explanation.contains("CQL raw: a"));
        assert!(mismatch.explanation.contains("REST raw: b"));
    }

    #[test]
    fn test_blob_compared_without_policy() {
        let verifier = RowVerifier::new(IgnorePolicy::compare_all());
        let table = TableRef::new("ks", "t");
        let result = verifier
            .verify_rows(&table, &[cql_row(1, "a")], &[rest_row(1, "a")], &schema())
            .unwrap();

        assert_eq!(result.column_mismatches.len(), 1);
        assert_eq!(result.column_mismatches[0].column, "payload");
    }

    #[test]
    fn test_column_set_mismatch_still_compares_shared() {
        let verifier = RowVerifier::default();
        let table = TableRef::new("ks", "t");
        let cql = cql_row(1, "a").with("extra", 7);
        let rest = rest_row(1, "z");

        let row = verifier.verify_row(&table, 0, &cql, &rest, &schema()).unwrap();
        let set = row.column_set_mismatch.as_ref().unwrap();
        assert_eq!(set.cql_only, vec!["extra".to_string()]);
        assert!(set.rest_only.is_empty());
        assert_eq!(row.mismatches.len(), 1);
        assert_eq!(row.mismatches[0].column, "name");
    }

    #[test]
    fn test_row_count_mismatch() {
        let verifier = RowVerifier::default();
        let table = TableRef::new("ks", "t");
        let result = verifier
            .verify_rows(&table, &[cql_row(1, "a"), cql_row(2, "b")], &[rest_row(1, "a")], &schema())
            .unwrap();

        assert_eq!(result.rows_compared, 0);
        assert!(result.row_count_mismatch());
        assert!(!result.is_in_sync());
    }

    #[test]
    fn test_rows_from_wrong_source_rejected() {
        let verifier = RowVerifier::default();
        let table = TableRef::new("ks", "t");

        let err = verifier
            .verify_rows(&table, &[rest_row(1, "a")], &[rest_row(1, "a")], &schema())
            .unwrap_err();
        assert!(matches!(err, VerifyError::InvalidInput(_)));
        assert!(err.to_string().contains("row 0 of ks.t passed as CQL came from REST"));

        let err = verifier
            .verify_row(&table, 3, &cql_row(1, "a"), &cql_row(1, "a"), &schema())
            .unwrap_err();
        assert!(err.to_string().contains("row 3 of ks.t passed as REST came from CQL"));
    }

    #[test]
    fn test_untyped_column_compared() {
        let verifier = RowVerifier::default();
        let table = TableRef::new("ks", "t");
        let cql = Row::new(Source::Typed).with("other", 3);
        let rest = Row::new(Source::Json).with("other", 3_i64);

        let row = verifier.verify_row(&table, 0, &cql, &rest, &schema()).unwrap();
        assert!(row.is_match());
        assert_eq!(row.columns_compared, 1);
    }

    #[test]
    fn test_skipped_table() {
        let verifier = RowVerifier::default();
        let table = TableRef::from_str("system.local").unwrap();
        let result = verifier.verify_rows(&table, &[], &[], &schema()).unwrap();
        assert!(result.skipped);
        assert!(result.skip_reason.is_some());

        let filter = TableFilter::default().with_skip_table(TableRef::new("ks", "t"));
        let verifier = RowVerifier::default().with_table_filter(filter);
        let result = verifier
            .verify_rows(&TableRef::new("ks", "t"), &[cql_row(1, "a")], &[], &schema())
            .unwrap();
        assert!(result.skipped);
        assert!(result.is_in_sync());
    }

    #[test]
    fn test_decimal_column_ignored_by_default() {
        let schema = TableSchema::new("ks", "d").with_column("amount", tag("decimal"));
        let table = TableRef::new("ks", "d");
        let cql = Row::new(Source::Typed).with("amount", RawValue::text("1.5"));
        let rest = Row::new(Source::Json).with("amount", 9.0_f64);

        let row = RowVerifier::default().verify_row(&table, 0, &cql, &rest, &schema).unwrap();
        assert!(row.is_match());
        assert_eq!(row.ignored.len(), 1);

        let verifier = RowVerifier::new(IgnorePolicy::blob_and_double_text_map());
        let row = verifier.verify_row(&table, 0, &cql, &rest, &schema).unwrap();
        assert!(!row.is_match());
    }
}
