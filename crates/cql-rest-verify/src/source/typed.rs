//! Captured CQL query results, replayed from JSON fixtures.
//!
//! A fixture holds the declared column types of one table together with the
//! rows a CQL driver returned for it:
//!
//! ```json
//! {
//!   "keyspace": "app",
//!   "table": "users",
//!   "columns": {"id": "uuid", "tags": "set<text>"},
//!   "partition_key": ["id"],
//!   "rows": [{"id": {"uuid": "..."}, "tags": {"set": [{"text": "a"}]}}]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ColumnTypeTag, RawValue, Row, Source, TableRef, TableSchema};
use crate::error::{Result, VerifyError};

/// Typed rows of one table plus its column types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedFixture {
    /// Keyspace name.
    pub keyspace: String,

    /// Table name.
    pub table: String,

    /// Declared type of each column.
    pub columns: BTreeMap<String, ColumnTypeTag>,

    /// Partition key column names.
    #[serde(default)]
    pub partition_key: Vec<String>,

    /// Clustering key column names.
    #[serde(default)]
    pub clustering_key: Vec<String>,

    /// Driver rows, keyed by column name.
    #[serde(default)]
    pub rows: Vec<BTreeMap<String, RawValue>>,
}

impl TypedFixture {
    /// Load a fixture from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = fs::read_to_string(path)?;
        let fixture: Self = serde_json::from_str(&content)
            .map_err(|e| VerifyError::fixture(&display, e.to_string()))?;
        fixture
            .validate()
            .map_err(|e| VerifyError::fixture(&display, e.to_string()))?;
        debug!(
            "Loaded fixture for {}: {} rows",
            fixture.table_ref(),
            fixture.rows.len()
        );
        Ok(fixture)
    }

    /// Parse and validate a fixture from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: Self = serde_json::from_str(json)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Check that every row column and key column is declared.
    pub fn validate(&self) -> Result<()> {
        if self.keyspace.is_empty() || self.table.is_empty() {
            return Err(VerifyError::invalid_input("keyspace and table are required"));
        }
        for key in self.partition_key.iter().chain(&self.clustering_key) {
            if !self.columns.contains_key(key) {
                return Err(VerifyError::invalid_input(format!(
                    "key column {} has no declared type",
                    key
                )));
            }
        }
        for (index, row) in self.rows.iter().enumerate() {
            if let Some(column) = row.keys().find(|c| !self.columns.contains_key(*c)) {
                return Err(VerifyError::invalid_input(format!(
                    "row {} has undeclared column {}",
                    index, column
                )));
            }
        }
        Ok(())
    }

    /// The `keyspace.table` this fixture was captured from.
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.keyspace, &self.table)
    }

    /// Column types and key layout as a schema.
    pub fn schema(&self) -> TableSchema {
        TableSchema {
            keyspace: self.keyspace.clone(),
            table: self.table.clone(),
            columns: self.columns.clone(),
            partition_key: self.partition_key.clone(),
            clustering_key: self.clustering_key.clone(),
        }
    }

    /// The captured rows as typed-source rows.
    pub fn rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|columns| Row {
                source: Source::Typed,
                columns: columns.clone(),
            })
            .collect()
    }
}
