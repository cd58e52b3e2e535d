//! Result types for row verification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::TableRef;

/// A column whose CQL and REST values are not equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMismatch {
    /// Position of the row pair within the compared result sets.
    pub row_index: usize,
    /// Column name.
    pub column: String,
    /// Declared column type, if known.
    pub column_type: Option<String>,
    /// Raw and normalized values from both sides.
    pub explanation: String,
}

impl fmt::Display for ColumnMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column_type {
            Some(t) => writeln!(f, "row {} differs on column {}: {}", self.row_index, self.column, t)?,
            None => writeln!(f, "row {} differs on column {}", self.row_index, self.column)?,
        }
        write!(f, "{}", self.explanation)
    }
}

/// Columns present on only one side of a row pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSetMismatch {
    /// Position of the row pair.
    pub row_index: usize,
    /// Columns only in the CQL row.
    pub cql_only: Vec<String>,
    /// Columns only in the REST row.
    pub rest_only: Vec<String>,
}

/// A column left out of comparison by the ignore policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredColumn {
    /// Column name.
    pub column: String,
    /// Declared column type.
    pub column_type: String,
    /// Reason from the matching ignore rule.
    pub reason: Option<String>,
}

/// Result of comparing one CQL row with one REST row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowVerifyResult {
    /// Position of the row pair.
    pub row_index: usize,
    /// Columns compared value-by-value.
    pub columns_compared: usize,
    /// Column name differences, if any.
    pub column_set_mismatch: Option<ColumnSetMismatch>,
    /// Value differences.
    pub mismatches: Vec<ColumnMismatch>,
    /// Columns skipped by the ignore policy.
    pub ignored: Vec<IgnoredColumn>,
}

impl RowVerifyResult {
    /// Create an empty result for a row pair.
    pub fn new(row_index: usize) -> Self {
        Self {
            row_index,
            ..Self::default()
        }
    }

    /// Check if both rows are equivalent.
    pub fn is_match(&self) -> bool {
        self.column_set_mismatch.is_none() && self.mismatches.is_empty()
    }
}

/// Verification result for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableVerifyResult {
    /// Table name (`keyspace.table`).
    pub table_name: String,
    /// Rows returned by the CQL query.
    pub cql_row_count: usize,
    /// Rows returned by the REST call.
    pub rest_row_count: usize,
    /// Row pairs compared.
    pub rows_compared: usize,
    /// Row pairs with any difference.
    pub rows_mismatched: usize,
    /// Column values compared across all rows.
    pub columns_compared: usize,
    /// Value differences across all rows.
    pub column_mismatches: Vec<ColumnMismatch>,
    /// Column name differences across all rows.
    pub column_set_mismatches: Vec<ColumnSetMismatch>,
    /// Distinct columns skipped by the ignore policy.
    pub ignored_columns: Vec<IgnoredColumn>,
    /// Whether the table was skipped entirely.
    pub skipped: bool,
    /// Reason for skipping (if skipped).
    pub skip_reason: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl TableVerifyResult {
    /// Create an empty result for a table.
    pub fn new(table: &TableRef, cql_row_count: usize, rest_row_count: usize) -> Self {
        Self {
            table_name: table.to_string(),
            cql_row_count,
            rest_row_count,
            rows_compared: 0,
            rows_mismatched: 0,
            columns_compared: 0,
            column_mismatches: Vec::new(),
            column_set_mismatches: Vec::new(),
            ignored_columns: Vec::new(),
            skipped: false,
            skip_reason: None,
            duration_ms: 0,
        }
    }

    /// Result for a table excluded from verification.
    pub fn skipped(table: &TableRef, reason: impl Into<String>) -> Self {
        Self {
            skipped: true,
            skip_reason: Some(reason.into()),
            ..Self::new(table, 0, 0)
        }
    }

    /// Whether the row counts differ.
    pub fn row_count_mismatch(&self) -> bool {
        self.cql_row_count != self.rest_row_count
    }

    /// Fold a row result into this table result.
    pub fn add_row(&mut self, row: RowVerifyResult) {
        self.rows_compared += 1;
        if !row.is_match() {
            self.rows_mismatched += 1;
        }
        self.columns_compared += row.columns_compared;
        self.column_mismatches.extend(row.mismatches);
        self.column_set_mismatches.extend(row.column_set_mismatch);
        for ignored in row.ignored {
            if !self.ignored_columns.iter().any(|c| c.column == ignored.column) {
                self.ignored_columns.push(ignored);
            }
        }
    }

    /// Number of reported differences (a row count mismatch counts once).
    pub fn difference_count(&self) -> usize {
        usize::from(self.row_count_mismatch())
            + self.column_mismatches.len()
            + self.column_set_mismatches.len()
    }

    /// Check if the CQL and REST results are equivalent.
    pub fn is_in_sync(&self) -> bool {
        self.difference_count() == 0
    }
}

/// Overall verification result for all tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyResult {
    /// Results for each table.
    pub tables: Vec<TableVerifyResult>,
    /// Total tables checked.
    pub tables_checked: usize,
    /// Tables whose results were equivalent.
    pub tables_in_sync: usize,
    /// Tables with differences.
    pub tables_with_differences: usize,
    /// Tables that were skipped.
    pub tables_skipped: usize,
    /// Total row pairs compared.
    pub total_rows_compared: usize,
    /// Total differences across all tables.
    pub total_differences: usize,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl VerifyResult {
    /// Create a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table result.
    pub fn add_table(&mut self, result: TableVerifyResult) {
        if result.skipped {
            self.tables_skipped += 1;
        } else {
            self.tables_checked += 1;
            if result.is_in_sync() {
                self.tables_in_sync += 1;
            } else {
                self.tables_with_differences += 1;
            }
            self.total_rows_compared += result.rows_compared;
            self.total_differences += result.difference_count();
        }
        self.duration_ms += result.duration_ms;
        self.tables.push(result);
    }

    /// Check if every checked table is in sync.
    pub fn is_in_sync(&self) -> bool {
        self.tables_with_differences == 0
    }
}
