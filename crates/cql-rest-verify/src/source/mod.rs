//! Row sources: captured CQL results, REST responses, and table/key selection.

pub mod json;
pub mod keys;
pub mod tables;
pub mod typed;

pub use json::{from_json_value, parse_rest_rows, rows_from_value};
pub use keys::{key_column_prefixes, rest_key_values, rows_by_key_resource};
pub use tables::{is_system_keyspace, parse_skip_list, TableFilter, DEFAULT_SKIP_TABLES};
pub use typed::TypedFixture;
