//! # cql-rest-verify
//!
//! Equivalence checking between Cassandra rows read through a CQL driver and
//! the same rows read back through a REST API.
//!
//! The two paths encode values differently: the driver hands back typed
//! values (UUIDs, timestamps, sets, typed maps), while the REST API returns
//! JSON where all of those collapse to strings, arrays and string-keyed
//! objects. This library provides:
//!
//! - **Normalization** of both encodings to one canonical form
//! - **Comparison** of a value pair with a diagnostic explanation on mismatch
//! - **Type classification** of columns the comparison must skip
//! - **Row verification** of whole result sets, with per-table reports
//! - **Table selection** and REST key rendering for row lookups
//!
//! ## Example
//!
//! ```rust,no_run
//! use cql_rest_verify::{parse_rest_rows, Config, RowVerifier, TypedFixture};
//!
//! fn main() -> cql_rest_verify::Result<()> {
//!     let config = Config::load("verify.yaml")?.with_env_overrides()?;
//!     let fixture = TypedFixture::load("users.typed.json")?;
//!     let rest_rows = parse_rest_rows(&std::fs::read_to_string("users.rest.json")?)?;
//!
//!     let verifier = RowVerifier::from_config(&config);
//!     let result = verifier.verify_rows(
//!         &fixture.table_ref(),
//!         &fixture.rows(),
//!         &rest_rows,
//!         &fixture.schema(),
//!     )?;
//!     println!("{} differences", result.difference_count());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod source;
pub mod typemap;
pub mod verify;

// Re-exports for convenient access
pub use crate::core::{
    ColumnTypeLookup, ColumnTypeTag, NormalizedValue, RawValue, Row, Source, TableRef, TableSchema,
};
pub use config::{Config, RestApiConfig};
pub use error::{Result, VerifyError};
pub use source::{parse_rest_rows, TableFilter, TypedFixture};
pub use typemap::{should_ignore, IgnorePolicy, IgnorePreset, IgnoreRule, TagPredicate};
pub use verify::{
    compare, normalize, ComparisonOutcome, RowVerifier, TableVerifyResult, VerifyResult,
};
