//! Core types shared by the normalizer, comparator and row driver.
//!
//! - [`value`]: raw values from either source and their normalized form
//! - [`schema`]: column type tags and table metadata
//! - [`traits`]: the column type lookup seam

pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{ColumnTypeTag, TableRef, TableSchema};
pub use traits::ColumnTypeLookup;
pub use value::{driver_timestamp_text, NormalizedValue, RawValue, Row, Source};
