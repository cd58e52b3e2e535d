//! Cross-source value normalization.
//!
//! This module handles the critical task of reducing a CQL driver value and
//! its REST JSON counterpart to the same canonical form.
//!
//! Key normalization rules, in precedence order:
//! - Doubles in a `decimal` column: exact decimal from the shortest round-trip text
//! - UUIDs: lowercase hyphenated text
//! - Timestamps: REST ISO form (`T` separator, `Z` suffix, millisecond fraction)
//! - Maps and JSON objects: flattened to sorted `(key, value)` pairs
//! - Sets and lists: element-wise, order kept
//! - Dates: `YYYY-MM-DD`
//! - Floats: rounded to 6 decimal places
//! - Everything else: unchanged

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use super::flatten::{flatten, flatten_object};
use crate::core::{driver_timestamp_text, ColumnTypeTag, NormalizedValue, RawValue};
use crate::error::{Result, VerifyError};

/// Decimal places kept when rounding floats.
pub const FLOAT_DECIMAL_PLACES: usize = 6;

/// Normalize a value from either source into its canonical form.
///
/// `column_type` is the declared type of the enclosing column, when known.
/// Nested collection elements are always normalized without type context.
///
/// Fails with [`VerifyError::InvalidInput`] only when a double in a decimal
/// column has no decimal representation (NaN, infinities, out of range).
pub fn normalize(value: &RawValue, column_type: Option<&ColumnTypeTag>) -> Result<NormalizedValue> {
    // JSON decoding turns decimals into doubles; undo that before any float rule
    if column_type.is_some_and(ColumnTypeTag::is_decimal) {
        match value {
            RawValue::Double(v) => return decimal_from_float_text(&v.to_string()),
            RawValue::Float(v) => return decimal_from_float_text(&v.to_string()),
            _ => {}
        }
    }

    let normalized = match value {
        RawValue::Uuid(v) => NormalizedValue::Text(v.hyphenated().to_string()),
        RawValue::Timestamp(v) => NormalizedValue::Text(timestamp_rest_format(&driver_timestamp_text(v))),
        RawValue::Map(pairs) => NormalizedValue::Pairs(flatten(pairs)?),
        RawValue::Object(fields) => NormalizedValue::Pairs(flatten_object(fields)?),
        RawValue::Set(items) => normalize_set(items)?,
        RawValue::Date(v) => NormalizedValue::Text(v.format("%Y-%m-%d").to_string()),
        RawValue::Double(v) => NormalizedValue::Float(round_places(*v, FLOAT_DECIMAL_PLACES)),
        RawValue::Float(v) => {
            NormalizedValue::Float(round_places(f64::from(*v), FLOAT_DECIMAL_PLACES))
        }
        RawValue::List(items) => NormalizedValue::Sequence(normalize_elements(items)?),
        RawValue::Null => NormalizedValue::Null,
        RawValue::Boolean(v) => NormalizedValue::Bool(*v),
        RawValue::TinyInt(v) => NormalizedValue::Int(i64::from(*v)),
        RawValue::SmallInt(v) => NormalizedValue::Int(i64::from(*v)),
        RawValue::Int(v) => NormalizedValue::Int(i64::from(*v)),
        RawValue::BigInt(v) => NormalizedValue::Int(*v),
        RawValue::Decimal(v) => NormalizedValue::Decimal(*v),
        RawValue::Text(v) => NormalizedValue::Text(v.clone()),
        RawValue::Blob(v) => NormalizedValue::Bytes(v.clone()),
    };

    Ok(normalized)
}

/// Rewrite a timestamp's text into the form the REST API prints.
///
/// - the space between date and time becomes `T`
/// - a missing `Z` suffix is appended
/// - when the text after the last `.` is exactly 7 characters (six
///   fractional digits plus `Z`), `000Z` collapses to `Z`, turning the
///   driver's microseconds into the API's milliseconds
///
/// Already-formatted REST timestamps pass through unchanged.
#[must_use]
pub fn timestamp_rest_format(text: &str) -> String {
    let mut n = text.replace(' ', "T");
    if !n.ends_with('Z') {
        n.push('Z');
    }
    let micro_fraction = n
        .rsplit('.')
        .next()
        .is_some_and(|fraction| fraction.chars().count() == 7);
    if micro_fraction {
        n = n.replace("000Z", "Z");
    }
    n
}

/// Round to `places` decimal places, ties to even on the exact binary value.
///
/// Non-finite values are returned unchanged.
#[must_use]
pub fn round_places(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

fn decimal_from_float_text(text: &str) -> Result<NormalizedValue> {
    Decimal::from_str(text)
        .map(NormalizedValue::Decimal)
        .map_err(|e| {
            VerifyError::invalid_input(format!("cannot read float {} as a decimal: {}", text, e))
        })
}

fn normalize_elements(items: &[RawValue]) -> Result<Vec<NormalizedValue>> {
    items.iter().map(|item| normalize(item, None)).collect()
}

fn normalize_set(items: &[RawValue]) -> Result<NormalizedValue> {
    let normalized = NormalizedValue::Sequence(normalize_elements(items)?);
    debug!(
        elements = items.len(),
        after = %normalized,
        "normalized set"
    );
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn tag(s: &str) -> ColumnTypeTag {
        ColumnTypeTag::parse(s).unwrap()
    }

    fn norm(value: RawValue) -> NormalizedValue {
        normalize(&value, None).unwrap()
    }

    #[test]
    fn test_timestamp_rest_format() {
        assert_eq!(
            timestamp_rest_format("2021-01-01 12:00:00.123000"),
            "2021-01-01T12:00:00.123Z"
        );
        assert_eq!(timestamp_rest_format("2021-01-01 12:00:00"), "2021-01-01T12:00:00Z");
        assert_eq!(
            timestamp_rest_format("2021-01-01T12:00:00.123Z"),
            "2021-01-01T12:00:00.123Z"
        );
        // only a 7 character fraction collapses
        assert_eq!(
            timestamp_rest_format("2021-01-01T12:00:00.1000Z"),
            "2021-01-01T12:00:00.1000Z"
        );
        assert_eq!(
            timestamp_rest_format("2021-01-01 12:00:00.120000"),
            "2021-01-01T12:00:00.120Z"
        );
    }

    #[test]
    fn test_timestamp_normalization() {
        let naive = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_milli_opt(12, 0, 0, 123)
            .unwrap();
        let value = RawValue::Timestamp(Utc.from_utc_datetime(&naive));
        let text = norm(value).canonical();
        assert_eq!(text, "2021-01-01T12:00:00.123Z");
        assert!(text.ends_with('Z'));
        assert_eq!(text.matches('T').count(), 1);
    }

    #[test]
    fn test_uuid_lowercase() {
        let id = Uuid::parse_str("A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11").unwrap();
        assert_eq!(
            norm(RawValue::Uuid(id)),
            NormalizedValue::Text("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11".to_string())
        );
    }

    #[test]
    fn test_float_rounding() {
        assert_eq!(norm(RawValue::Double(1.23456789)), NormalizedValue::Float(1.234568));
        assert_eq!(norm(RawValue::Double(-0.0000004)), NormalizedValue::Float(-0.0));
        assert_eq!(norm(RawValue::Double(12345.0)), NormalizedValue::Float(12345.0));
        assert_eq!(norm(RawValue::Float(1.1f32)), NormalizedValue::Float(1.1));
    }

    #[test]
    fn test_round_half_even_ties() {
        // 0.0078125 and 0.0234375 are exact in binary
        assert_eq!(round_places(0.0078125, 6), 0.007812);
        assert_eq!(round_places(0.0234375, 6), 0.023438);
        assert_eq!(round_places(-0.0078125, 6), -0.007812);
        // stored just below the tie
        assert_eq!(round_places(2.6750005, 6), 2.675);
        // stored just above the tie
        assert_eq!(round_places(1.0000005, 6), 1.000001);
    }

    #[test]
    fn test_round_places_non_finite() {
        assert!(round_places(f64::NAN, 6).is_nan());
        assert_eq!(round_places(f64::INFINITY, 6), f64::INFINITY);
    }

    #[test]
    fn test_decimal_context_float() {
        let normalized = normalize(&RawValue::Double(0.1), Some(&tag("decimal"))).unwrap();
        assert_eq!(normalized, NormalizedValue::Decimal(Decimal::from_str("0.1").unwrap()));
        assert_eq!(normalized.canonical(), "0.1");

        // not a decimal column: generic float rule
        let normalized = normalize(&RawValue::Double(0.1), Some(&tag("double"))).unwrap();
        assert_eq!(normalized, NormalizedValue::Float(0.1));
    }

    #[test]
    fn test_decimal_context_rejects_nan() {
        let err = normalize(&RawValue::Double(f64::NAN), Some(&tag("decimal"))).unwrap_err();
        assert!(matches!(err, VerifyError::InvalidInput(_)));
    }

    #[test]
    fn test_date_normalization() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(norm(RawValue::Date(date)), NormalizedValue::Text("2020-02-29".to_string()));
    }

    #[test]
    fn test_set_keeps_order() {
        let set = RawValue::Set(vec![RawValue::Int(3), RawValue::Int(1)]);
        assert_eq!(
            norm(set),
            NormalizedValue::Sequence(vec![NormalizedValue::Int(3), NormalizedValue::Int(1)])
        );
    }

    #[test]
    fn test_list_elements_normalized() {
        let id = Uuid::nil();
        let list = RawValue::List(vec![RawValue::Uuid(id), RawValue::Double(0.1234567)]);
        assert_eq!(
            norm(list).canonical(),
            "['00000000-0000-0000-0000-000000000000', 0.123457]"
        );
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(norm(RawValue::Null), NormalizedValue::Null);
        assert_eq!(norm(RawValue::Boolean(true)), NormalizedValue::Bool(true));
        assert_eq!(norm(RawValue::SmallInt(-7)), NormalizedValue::Int(-7));
        assert_eq!(norm(RawValue::text("x")), NormalizedValue::Text("x".to_string()));
        assert_eq!(norm(RawValue::Blob(vec![1, 2])), NormalizedValue::Bytes(vec![1, 2]));
        let d = Decimal::from_str("10.50").unwrap();
        assert_eq!(norm(RawValue::Decimal(d)), NormalizedValue::Decimal(d));
    }

    #[test]
    fn test_idempotent() {
        let naive = NaiveDate::from_ymd_opt(2022, 6, 1)
            .unwrap()
            .and_hms_milli_opt(8, 30, 15, 7)
            .unwrap();
        let samples = vec![
            RawValue::Double(3.14159265),
            RawValue::Double(1e20),
            RawValue::Uuid(Uuid::nil()),
            RawValue::Timestamp(Utc.from_utc_datetime(&naive)),
            RawValue::Date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()),
            RawValue::Map(vec![
                (RawValue::Int(3), RawValue::text("x")),
                (RawValue::Int(1), RawValue::Double(0.3333333)),
            ]),
            RawValue::Set(vec![RawValue::text("b"), RawValue::text("a")]),
            RawValue::Object(vec![(
                "k".to_string(),
                RawValue::List(vec![RawValue::BigInt(1), RawValue::Null]),
            )]),
        ];

        for sample in samples {
            let once = norm(sample.clone());
            let twice = norm(once.clone().into_raw());
            assert_eq!(once, twice, "normalization not idempotent for {}", sample);
        }
    }
}
