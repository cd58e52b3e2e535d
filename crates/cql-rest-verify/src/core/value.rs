//! Value types for the two row representations being compared.
//!
//! [`RawValue`] is what either access path hands us: driver-native values from
//! the CQL side, or values decoded from a REST JSON document. [`NormalizedValue`]
//! is the canonical form both sides are reduced to before comparison.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write as _};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which access path produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Driver-native values from a CQL query.
    Typed,
    /// Values parsed from a REST JSON response.
    Json,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Typed => write!(f, "CQL"),
            Source::Json => write!(f, "REST"),
        }
    }
}

/// A column value as delivered by one of the sources.
///
/// The JSON side only ever produces `Null`, `Boolean`, `BigInt`, `Double`,
/// `Text`, `List` and `Object`: sets, maps, timestamps and UUIDs all lose
/// their type on the way through JSON.
///
/// Fixtures serialize this externally tagged, e.g. `{"uuid": "..."}`,
/// `{"map": [[{"int": 3}, {"text": "x"}]]}` or `"null"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawValue {
    Null,

    Boolean(bool),

    /// 8-bit signed integer.
    #[serde(rename = "tinyint")]
    TinyInt(i8),

    /// 16-bit signed integer.
    #[serde(rename = "smallint")]
    SmallInt(i16),

    /// 32-bit signed integer.
    Int(i32),

    /// 64-bit signed integer. JSON integers decode to this.
    #[serde(rename = "bigint")]
    BigInt(i64),

    /// 32-bit float.
    Float(f32),

    /// 64-bit float. JSON fractional numbers decode to this.
    Double(f64),

    /// Fixed-precision base-10 decimal.
    Decimal(Decimal),

    Text(String),

    /// Binary data, hex encoded in fixtures.
    Blob(#[serde(with = "hex")] Vec<u8>),

    Uuid(Uuid),

    /// UTC instant with millisecond precision.
    Timestamp(DateTime<Utc>),

    /// Calendar day.
    Date(NaiveDate),

    /// Ordered map as returned by the driver; keys may be any kind.
    Map(Vec<(RawValue, RawValue)>),

    /// Unordered set, elements assumed unique.
    Set(Vec<RawValue>),

    List(Vec<RawValue>),

    /// Generic JSON object with string keys.
    Object(Vec<(String, RawValue)>),
}

impl RawValue {
    /// Create a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        RawValue::Text(s.into())
    }
}

/// Render an instant the way the CQL driver prints it:
/// `YYYY-MM-DD HH:MM:SS`, followed by `.ffffff` only when there is a
/// sub-second part.
#[must_use]
pub fn driver_timestamp_text(ts: &DateTime<Utc>) -> String {
    let seconds = ts.format("%Y-%m-%d %H:%M:%S");
    match ts.timestamp_subsec_micros() {
        0 => seconds.to_string(),
        micros => format!("{}.{:06}", seconds, micros),
    }
}

fn write_joined<'a, T: fmt::Display + 'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = &'a T>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("null"),
            RawValue::Boolean(v) => write!(f, "{}", v),
            RawValue::TinyInt(v) => write!(f, "{}", v),
            RawValue::SmallInt(v) => write!(f, "{}", v),
            RawValue::Int(v) => write!(f, "{}", v),
            RawValue::BigInt(v) => write!(f, "{}", v),
            RawValue::Float(v) => write!(f, "{}", v),
            RawValue::Double(v) => write!(f, "{}", v),
            RawValue::Decimal(v) => write!(f, "{}", v),
            RawValue::Text(v) => f.write_str(v),
            RawValue::Blob(v) => write!(f, "0x{}", hex::encode(v)),
            RawValue::Uuid(v) => write!(f, "{}", v),
            RawValue::Timestamp(v) => f.write_str(&driver_timestamp_text(v)),
            RawValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            RawValue::Map(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            RawValue::Set(items) => {
                f.write_str("{")?;
                write_joined(f, items)?;
                f.write_str("}")
            }
            RawValue::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            RawValue::Object(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\": {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

// From implementations for common types
impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Boolean(v)
    }
}

impl From<i8> for RawValue {
    fn from(v: i8) -> Self {
        RawValue::TinyInt(v)
    }
}

impl From<i16> for RawValue {
    fn from(v: i16) -> Self {
        RawValue::SmallInt(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Int(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::BigInt(v)
    }
}

impl From<f32> for RawValue {
    fn from(v: f32) -> Self {
        RawValue::Float(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Double(v)
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(v: Vec<u8>) -> Self {
        RawValue::Blob(v)
    }
}

impl From<Uuid> for RawValue {
    fn from(v: Uuid) -> Self {
        RawValue::Uuid(v)
    }
}

impl From<Decimal> for RawValue {
    fn from(v: Decimal) -> Self {
        RawValue::Decimal(v)
    }
}

impl From<DateTime<Utc>> for RawValue {
    fn from(v: DateTime<Utc>) -> Self {
        RawValue::Timestamp(v)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(v: NaiveDate) -> Self {
        RawValue::Date(v)
    }
}

/// One row from either source, keyed by column name.
///
/// Nested values inherit the row's [`Source`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Access path that produced this row.
    pub source: Source,

    /// Column values by name.
    pub columns: BTreeMap<String, RawValue>,
}

impl Row {
    /// Create an empty row for the given source.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            columns: BTreeMap::new(),
        }
    }

    /// Add a column value.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    /// Get a column value.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.columns.get(column)
    }

    /// Names of all columns present in this row.
    #[must_use]
    pub fn column_names(&self) -> BTreeSet<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Canonical, source-independent form of a value.
///
/// Two values are considered equivalent when their canonical strings
/// (the `Display` output) are identical. Text prints bare at the top level
/// and single-quoted when nested, so `['a, b']` never collides with
/// `['a', 'b']`.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    /// Elements of a set or list.
    Sequence(Vec<NormalizedValue>),
    /// Flattened map entries, sorted by key then value.
    Pairs(Vec<(String, NormalizedValue)>),
}

impl NormalizedValue {
    /// Canonical string used for comparisons.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Canonical string of this value as it appears inside a collection.
    #[must_use]
    pub fn repr(&self) -> String {
        Nested(self).to_string()
    }

    /// Check if this is a top-level sequence.
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, NormalizedValue::Sequence(_))
    }

    /// Turn a normalized value back into an equivalent raw value.
    ///
    /// Normalizing the result yields `self` again.
    #[must_use]
    pub fn into_raw(self) -> RawValue {
        match self {
            NormalizedValue::Null => RawValue::Null,
            NormalizedValue::Bool(v) => RawValue::Boolean(v),
            NormalizedValue::Int(v) => RawValue::BigInt(v),
            NormalizedValue::Float(v) => RawValue::Double(v),
            NormalizedValue::Decimal(v) => RawValue::Decimal(v),
            NormalizedValue::Text(v) => RawValue::Text(v),
            NormalizedValue::Bytes(v) => RawValue::Blob(v),
            NormalizedValue::Sequence(items) => {
                RawValue::List(items.into_iter().map(NormalizedValue::into_raw).collect())
            }
            NormalizedValue::Pairs(pairs) => RawValue::Map(
                pairs
                    .into_iter()
                    .map(|(key, value)| (RawValue::Text(key), value.into_raw()))
                    .collect(),
            ),
        }
    }

    fn write_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Null => f.write_str("null"),
            NormalizedValue::Bool(v) => write!(f, "{}", v),
            NormalizedValue::Int(v) => write!(f, "{}", v),
            NormalizedValue::Float(v) => f.write_str(&format_float(*v)),
            NormalizedValue::Decimal(v) => write!(f, "{}", v),
            NormalizedValue::Text(v) => write_quoted(f, v),
            NormalizedValue::Bytes(v) => write!(f, "0x{}", hex::encode(v)),
            NormalizedValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.write_nested(f)?;
                }
                f.write_str("]")
            }
            NormalizedValue::Pairs(pairs) => {
                f.write_str("[")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("(")?;
                    write_quoted(f, key)?;
                    f.write_str(", ")?;
                    value.write_nested(f)?;
                    f.write_str(")")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Text(v) => f.write_str(v),
            other => other.write_nested(f),
        }
    }
}

struct Nested<'a>(&'a NormalizedValue);

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_nested(f)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('\'')?;
    for c in s.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('\'')
}

/// Format a float so integral values keep a `.0` suffix (`1.0`, not `1`),
/// matching how JSON serializers print doubles.
pub(crate) fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = v.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(millis: u32) -> DateTime<Utc> {
        let naive = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_milli_opt(12, 0, 0, millis)
            .unwrap();
        Utc.from_utc_datetime(&naive)
    }

    #[test]
    fn test_driver_timestamp_text() {
        assert_eq!(driver_timestamp_text(&ts(123)), "2021-01-01 12:00:00.123000");
        assert_eq!(driver_timestamp_text(&ts(0)), "2021-01-01 12:00:00");
    }

    #[test]
    fn test_row_builder() {
        let row = Row::new(Source::Typed)
            .with("id", 1i32)
            .with("name", "alice");
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("id"), Some(&RawValue::Int(1)));
        assert_eq!(row.column_names().into_iter().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_canonical_text_quoting() {
        let top = NormalizedValue::Text("a, b".to_string());
        assert_eq!(top.canonical(), "a, b");

        let nested = NormalizedValue::Sequence(vec![NormalizedValue::Text("a, b".to_string())]);
        let split = NormalizedValue::Sequence(vec![
            NormalizedValue::Text("a".to_string()),
            NormalizedValue::Text("b".to_string()),
        ]);
        assert_eq!(nested.canonical(), "['a, b']");
        assert_eq!(split.canonical(), "['a', 'b']");
    }

    #[test]
    fn test_canonical_pairs() {
        let pairs = NormalizedValue::Pairs(vec![
            ("1".to_string(), NormalizedValue::Text("y".to_string())),
            ("3".to_string(), NormalizedValue::Float(2.0)),
        ]);
        assert_eq!(pairs.canonical(), "[('1', 'y'), ('3', 2.0)]");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(f64::NAN), "nan");
    }

    #[test]
    fn test_raw_value_serde_tags() {
        let value: RawValue =
            serde_json::from_str(r#"{"map": [[{"int": 3}, {"text": "x"}]]}"#).unwrap();
        assert_eq!(
            value,
            RawValue::Map(vec![(RawValue::Int(3), RawValue::text("x"))])
        );

        let blob: RawValue = serde_json::from_str(r#"{"blob": "cafe"}"#).unwrap();
        assert_eq!(blob, RawValue::Blob(vec![0xca, 0xfe]));

        let null: RawValue = serde_json::from_str(r#""null""#).unwrap();
        assert_eq!(null, RawValue::Null);
    }

    #[test]
    fn test_from_implementations() {
        let v: RawValue = 42i32.into();
        assert_eq!(v, RawValue::Int(42));

        let v: RawValue = "hello".to_string().into();
        assert_eq!(v, RawValue::Text("hello".to_string()));
    }
}
