//! Seams between the comparison core and its collaborators.

use super::schema::{ColumnTypeTag, TableRef, TableSchema};

/// Resolve the declared type of a column.
///
/// The row-comparison driver asks this for every column it compares; the
/// answer only steers normalization, so a missing tag is not an error.
pub trait ColumnTypeLookup {
    /// Declared type of `column` in `table`, if known.
    fn column_type(&self, table: &TableRef, column: &str) -> Option<&ColumnTypeTag>;
}

impl ColumnTypeLookup for TableSchema {
    fn column_type(&self, table: &TableRef, column: &str) -> Option<&ColumnTypeTag> {
        if self.describes(table) {
            self.columns.get(column)
        } else {
            None
        }
    }
}

impl<T: ColumnTypeLookup> ColumnTypeLookup for [T] {
    fn column_type(&self, table: &TableRef, column: &str) -> Option<&ColumnTypeTag> {
        self.iter().find_map(|lookup| lookup.column_type(table, column))
    }
}

impl<T: ColumnTypeLookup> ColumnTypeLookup for Vec<T> {
    fn column_type(&self, table: &TableRef, column: &str) -> Option<&ColumnTypeTag> {
        self.as_slice().column_type(table, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(table: &str) -> TableSchema {
        TableSchema::new("ks", table).with_column("v", ColumnTypeTag::parse("decimal").unwrap())
    }

    #[test]
    fn test_schema_lookup_matches_table() {
        let s = schema("prices");
        assert_eq!(
            s.column_type(&TableRef::new("ks", "prices"), "v").map(ColumnTypeTag::as_str),
            Some("decimal")
        );
        assert!(s.column_type(&TableRef::new("ks", "other"), "v").is_none());
        assert!(s.column_type(&TableRef::new("ks", "prices"), "missing").is_none());
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = vec![schema("a"), schema("b")];
        assert!(catalog.column_type(&TableRef::new("ks", "b"), "v").is_some());
        assert!(catalog.column_type(&TableRef::new("ks", "c"), "v").is_none());
    }
}
