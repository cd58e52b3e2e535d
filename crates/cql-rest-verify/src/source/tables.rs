//! Table selection: which tables take part in a verification run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::TableRef;
use crate::error::Result;

/// Tables skipped unless explicitly re-enabled.
///
/// `system.prepared_statements` changes between the two reads, and
/// `system.local` is answered by different nodes for CQL and REST.
pub const DEFAULT_SKIP_TABLES: &[(&str, &str)] =
    &[("system", "prepared_statements"), ("system", "local")];

/// Keyspace prefixes treated as system keyspaces.
const SYSTEM_KEYSPACE_PREFIXES: &[&str] = &["system_", "dse_", "data_endpoint_auth"];

/// Decides which tables are verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFilter {
    /// Extra tables to skip (`keyspace.table`).
    #[serde(default)]
    pub skip_tables: BTreeSet<TableRef>,

    /// Also skip [`DEFAULT_SKIP_TABLES`] (default: true).
    #[serde(default = "default_true")]
    pub include_default_skips: bool,

    /// Skip every table in a system keyspace (default: true).
    #[serde(default = "default_true")]
    pub skip_system: bool,
}

impl Default for TableFilter {
    fn default() -> Self {
        Self {
            skip_tables: BTreeSet::new(),
            include_default_skips: true,
            skip_system: true,
        }
    }
}

impl TableFilter {
    /// Add a table to the skip list.
    pub fn with_skip_table(mut self, table: TableRef) -> Self {
        self.skip_tables.insert(table);
        self
    }

    /// Add every table of a `ks.table,ks.table` list to the skip list.
    pub fn extend_from_list(&mut self, list: &str) -> Result<()> {
        let tables = parse_skip_list(list)?;
        if !tables.is_empty() {
            info!("Skipping tables from list: {}", list);
        }
        self.skip_tables.extend(tables);
        Ok(())
    }

    /// Check whether a table is on the skip list (defaults included).
    #[must_use]
    pub fn is_listed(&self, table: &TableRef) -> bool {
        self.skip_tables.contains(table)
            || (self.include_default_skips
                && DEFAULT_SKIP_TABLES
                    .iter()
                    .any(|(ks, t)| table.keyspace == *ks && table.table == *t))
    }

    /// Why a table is skipped, or `None` if it is verified.
    #[must_use]
    pub fn skip_reason(&self, table: &TableRef) -> Option<String> {
        if self.is_listed(table) {
            return Some("listed in skip tables".to_string());
        }
        if self.skip_system && is_system_keyspace(&table.keyspace) {
            return Some(format!("{} is a system keyspace", table.keyspace));
        }
        None
    }

    /// Check whether a table is skipped.
    #[must_use]
    pub fn is_skipped(&self, table: &TableRef) -> bool {
        self.skip_reason(table).is_some()
    }

    /// Keep the tables that are not skipped, in input order.
    pub fn select_tables<'a>(&self, tables: impl IntoIterator<Item = &'a TableRef>) -> Vec<TableRef> {
        tables
            .into_iter()
            .filter(|table| !self.is_skipped(table))
            .cloned()
            .collect()
    }
}

/// Check whether a keyspace holds system tables.
#[must_use]
pub fn is_system_keyspace(keyspace: &str) -> bool {
    keyspace == "system"
        || SYSTEM_KEYSPACE_PREFIXES
            .iter()
            .any(|prefix| keyspace.starts_with(prefix))
}

/// Parse a comma-separated `ks.table` list; empty entries are ignored.
pub fn parse_skip_list(list: &str) -> Result<Vec<TableRef>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse::<TableRef>)
        .collect()
}

fn default_true() -> bool {
    true
}
