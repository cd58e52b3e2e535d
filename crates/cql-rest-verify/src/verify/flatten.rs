//! Map flattening into canonical, order-independent pair lists.
//!
//! REST JSON can only carry text keys, so both sides reduce map keys to the
//! canonical string of the normalized key. The resulting pairs are sorted by
//! key, then by the value's canonical form, so insertion or hash order never
//! affects the result.

use super::normalize::normalize;
use crate::core::{NormalizedValue, RawValue};
use crate::error::Result;

/// Flatten map entries into sorted `(key string, normalized value)` pairs.
///
/// Keys and values are normalized without type context; element types of
/// the enclosing column are not threaded through.
pub fn flatten(items: &[(RawValue, RawValue)]) -> Result<Vec<(String, NormalizedValue)>> {
    let pairs = items
        .iter()
        .map(|(key, value)| -> Result<(String, NormalizedValue)> {
            Ok((normalize(key, None)?.canonical(), normalize(value, None)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(sort_pairs(pairs))
}

/// Flatten a JSON object, whose keys are already text.
pub fn flatten_object(fields: &[(String, RawValue)]) -> Result<Vec<(String, NormalizedValue)>> {
    let pairs = fields
        .iter()
        .map(|(key, value)| -> Result<(String, NormalizedValue)> {
            Ok((key.clone(), normalize(value, None)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(sort_pairs(pairs))
}

fn sort_pairs(pairs: Vec<(String, NormalizedValue)>) -> Vec<(String, NormalizedValue)> {
    let mut keyed: Vec<_> = pairs
        .into_iter()
        .map(|(key, value)| ((key, value.repr()), value))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    keyed
        .into_iter()
        .map(|((key, _), value)| (key, value))
        .collect()
}
