//! Equivalence check between a CQL value and its REST counterpart.

use serde::{Deserialize, Serialize};

use super::normalize::normalize;
use crate::core::{ColumnTypeTag, NormalizedValue, RawValue};
use crate::error::Result;

/// Result of comparing one value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    /// Whether both sides are equivalent.
    pub equal: bool,

    /// Diagnostic text, present only on mismatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ComparisonOutcome {
    /// Outcome for equivalent values.
    pub fn matched() -> Self {
        Self {
            equal: true,
            explanation: None,
        }
    }

    /// Outcome for differing values.
    pub fn mismatched(explanation: impl Into<String>) -> Self {
        Self {
            equal: false,
            explanation: Some(explanation.into()),
        }
    }
}

/// Compare a CQL value with a REST value for a column of the given type.
///
/// Decimal columns are compared textually after stripping trailing zeros
/// (see [`strip_trailing_zeros`]). Everything else is normalized on both
/// sides; a top-level sequence is sorted by element, then the canonical
/// strings must match exactly.
pub fn compare(
    cql_value: &RawValue,
    rest_value: &RawValue,
    column_type: Option<&ColumnTypeTag>,
) -> Result<ComparisonOutcome> {
    if column_type.is_some_and(ColumnTypeTag::is_decimal) {
        return Ok(compare_decimal_text(cql_value, rest_value));
    }

    let cql_normal = sort_sequence(normalize(cql_value, column_type)?);
    let rest_normal = sort_sequence(normalize(rest_value, column_type)?);

    if cql_normal.canonical() == rest_normal.canonical() {
        return Ok(ComparisonOutcome::matched());
    }

    Ok(ComparisonOutcome::mismatched(
        [
            format!("CQL raw: {}", cql_value),
            format!("CQL normal: {}", cql_normal),
            format!("REST raw: {}", rest_value),
            format!("REST normal: {}", rest_normal),
        ]
        .join("\n"),
    ))
}

/// Strip trailing `0` characters, and the decimal point that stripping
/// leaves dangling, so `100.0`, `100.00` and `100` all read `1`.
///
/// This tolerates differing zero padding between the encodings. It is not a
/// numeric comparison: `100` and `1` also strip to the same text.
#[must_use]
pub fn strip_trailing_zeros(text: &str) -> &str {
    text.trim_end_matches(|c: char| c == '0' || c == '.')
}

fn compare_decimal_text(cql_value: &RawValue, rest_value: &RawValue) -> ComparisonOutcome {
    let cql_text = cql_value.to_string();
    let rest_text = rest_value.to_string();
    let cql_stripped = strip_trailing_zeros(&cql_text);
    let rest_stripped = strip_trailing_zeros(&rest_text);

    if cql_stripped == rest_stripped {
        return ComparisonOutcome::matched();
    }

    ComparisonOutcome::mismatched(
        [
            format!("CQL raw: {}", cql_value),
            format!("CQL stripped: {}", cql_stripped),
            format!("REST raw: {}", rest_value),
            format!("REST stripped: {}", rest_stripped),
        ]
        .join("\n"),
    )
}

/// Sort a top-level sequence by its elements' canonical form.
///
/// Both sets and lists are sorted here, so element order never causes a
/// mismatch at the top level. Pairs are already sorted by the flattener.
fn sort_sequence(value: NormalizedValue) -> NormalizedValue {
    match value {
        NormalizedValue::Sequence(items) => {
            let mut keyed: Vec<(String, NormalizedValue)> =
                items.into_iter().map(|item| (item.repr(), item)).collect();
            keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
            NormalizedValue::Sequence(keyed.into_iter().map(|(_, item)| item).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    fn tag(s: &str) -> ColumnTypeTag {
        ColumnTypeTag::parse(s).unwrap()
    }

    #[test]
    fn test_decimal_trailing_zeros() {
        let decimal = tag("decimal");
        let cql = RawValue::Decimal(Decimal::from_str("100.0").unwrap());
        let outcome = compare(&cql, &RawValue::text("100"), Some(&decimal)).unwrap();
        assert!(outcome.equal);
        assert!(outcome.explanation.is_none());

        let cql = RawValue::Decimal(Decimal::from_str("12.50").unwrap());
        assert!(compare(&cql, &RawValue::Double(12.5), Some(&decimal)).unwrap().equal);
    }

    #[test]
    fn test_decimal_strip_is_not_numeric() {
        // known weak spot: magnitudes differing by powers of ten compare equal
        let decimal = tag("decimal");
        let outcome = compare(&RawValue::text("100"), &RawValue::text("1"), Some(&decimal)).unwrap();
        assert!(outcome.equal);

        let outcome = compare(&RawValue::text("1.5"), &RawValue::text("1.25"), Some(&decimal)).unwrap();
        assert!(!outcome.equal);
        let explanation = outcome.explanation.unwrap();
        assert!(explanation.contains("CQL stripped: 1.5"));
        assert!(explanation.contains("REST stripped: 1.25"));
    }

    #[test]
    fn test_strip_trailing_zeros() {
        assert_eq!(strip_trailing_zeros("100.0"), "1");
        assert_eq!(strip_trailing_zeros("10.50"), "10.5");
        assert_eq!(strip_trailing_zeros("0.5"), "0.5");
        assert_eq!(strip_trailing_zeros("7"), "7");
    }

    #[test]
    fn test_uuid_and_timestamp_columns() {
        let id = Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap();
        let outcome = compare(
            &RawValue::Uuid(id),
            &RawValue::text("123e4567-e89b-12d3-a456-426614174000"),
            Some(&tag("uuid")),
        )
        .unwrap();
        assert!(outcome.equal);

        let naive = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_micro_opt(12, 0, 0, 123_000)
            .unwrap();
        let outcome = compare(
            &RawValue::Timestamp(Utc.from_utc_datetime(&naive)),
            &RawValue::text("2021-01-01T12:00:00.123Z"),
            Some(&tag("timestamp")),
        )
        .unwrap();
        assert!(outcome.equal);
    }

    #[test]
    fn test_sets_compare_unordered() {
        let cql = RawValue::Set(vec![RawValue::text("a"), RawValue::text("b")]);
        let rest = RawValue::List(vec![RawValue::text("b"), RawValue::text("a")]);
        assert!(compare(&cql, &rest, Some(&tag("set<text>"))).unwrap().equal);
    }

    #[test]
    fn test_map_against_json_object() {
        let cql = RawValue::Map(vec![
            (RawValue::Int(3), RawValue::text("x")),
            (RawValue::Int(1), RawValue::text("y")),
        ]);
        let rest = RawValue::Object(vec![
            ("1".to_string(), RawValue::text("y")),
            ("3".to_string(), RawValue::text("x")),
        ]);
        assert!(compare(&cql, &rest, Some(&tag("map<int, text>"))).unwrap().equal);
    }

    #[test]
    fn test_float_precision_tolerance() {
        let outcome = compare(
            &RawValue::Float(0.1f32),
            &RawValue::Double(0.1),
            Some(&tag("float")),
        )
        .unwrap();
        assert!(outcome.equal);
    }

    #[test]
    fn test_mismatch_explanation() {
        let outcome = compare(&RawValue::Int(1), &RawValue::BigInt(2), None).unwrap();
        assert!(!outcome.equal);
        assert_eq!(
            outcome.explanation.as_deref(),
            Some("CQL raw: 1\nCQL normal: 1\nREST raw: 2\nREST normal: 2")
        );
    }

    #[test]
    fn test_int_widths_compare_equal() {
        assert!(compare(&RawValue::TinyInt(5), &RawValue::BigInt(5), Some(&tag("tinyint")))
            .unwrap()
            .equal);
    }

    #[test]
    fn test_null_columns() {
        assert!(compare(&RawValue::Null, &RawValue::Null, Some(&tag("text"))).unwrap().equal);
        assert!(!compare(&RawValue::Null, &RawValue::text("x"), Some(&tag("text"))).unwrap().equal);
    }
}
