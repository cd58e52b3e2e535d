//! Table and column metadata needed to steer normalization.
//!
//! Only the declared CQL type of each column matters here; everything else
//! about the schema belongs to the collaborators that fetch rows.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

/// Declared CQL type of a column, e.g. `decimal`, `timestamp`,
/// `map<int, text>` or `frozen<set<uuid>>`.
///
/// The tag is kept verbatim (classification rules match it exactly), but it
/// must be non-empty and have balanced angle brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnTypeTag(String);

impl ColumnTypeTag {
    /// Parse and validate a type tag.
    pub fn parse(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(VerifyError::invalid_input("column type tag is empty"));
        }

        let mut depth: usize = 0;
        for c in tag.chars() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        VerifyError::invalid_input(format!(
                            "column type tag '{}' has an unmatched '>'",
                            tag
                        ))
                    })?;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(VerifyError::invalid_input(format!(
                "column type tag '{}' has an unclosed '<'",
                tag
            )));
        }

        Ok(Self(tag))
    }

    /// The tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the column is a plain `decimal`.
    ///
    /// Only the exact tag counts; `list<decimal>` is a collection.
    #[must_use]
    pub fn is_decimal(&self) -> bool {
        self.0 == "decimal"
    }

    /// Whether the tag mentions `timestamp` anywhere.
    #[must_use]
    pub fn is_timestamp(&self) -> bool {
        self.0.contains("timestamp")
    }
}

impl fmt::Display for ColumnTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ColumnTypeTag {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ColumnTypeTag {
    type Error = VerifyError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<ColumnTypeTag> for String {
    fn from(tag: ColumnTypeTag) -> Self {
        tag.0
    }
}

/// A `keyspace.table` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableRef {
    pub keyspace: String,
    pub table: String,
}

impl TableRef {
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.table)
    }
}

impl FromStr for TableRef {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('.') {
            Some((keyspace, table))
                if !keyspace.is_empty() && !table.is_empty() && !table.contains('.') =>
            {
                Ok(Self::new(keyspace, table))
            }
            _ => Err(VerifyError::invalid_input(format!(
                "expected 'keyspace.table', got '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for TableRef {
    type Error = VerifyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TableRef> for String {
    fn from(table: TableRef) -> Self {
        table.to_string()
    }
}

/// Column types and key layout of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Keyspace name.
    pub keyspace: String,

    /// Table name.
    pub table: String,

    /// Declared type of each column.
    pub columns: BTreeMap<String, ColumnTypeTag>,

    /// Partition key column names, in key order.
    #[serde(default)]
    pub partition_key: Vec<String>,

    /// Clustering key column names, in key order.
    #[serde(default)]
    pub clustering_key: Vec<String>,
}

impl TableSchema {
    /// Create a schema with no columns.
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
            columns: BTreeMap::new(),
            partition_key: Vec::new(),
            clustering_key: Vec::new(),
        }
    }

    /// Add a column with its declared type.
    pub fn with_column(mut self, name: impl Into<String>, tag: ColumnTypeTag) -> Self {
        self.columns.insert(name.into(), tag);
        self
    }

    /// The `keyspace.table` this schema describes.
    #[must_use]
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.keyspace, &self.table)
    }

    /// Whether this schema describes the given table.
    #[must_use]
    pub fn describes(&self, table: &TableRef) -> bool {
        self.keyspace == table.keyspace && self.table == table.table
    }
}
