//! Lenient field deserializers for run payloads.
//!
//! Upstream writers are not strict about types: counts arrive as strings,
//! arrays arrive as `null`, samples arrive half-filled. Every helper here
//! accepts any JSON value and degrades to "absent" instead of failing, so a
//! single odd field never discards the rest of the run.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce a JSON value to a finite number.
///
/// Numbers pass through, numeric strings are parsed (surrounding whitespace
/// ignored), everything else is `None`.
#[must_use]
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Coerce a JSON value to a display string.
///
/// Strings pass through, numbers and booleans are stringified, everything
/// else is `None`.
#[must_use]
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value))
}

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text(&value))
}

/// Deserialize a sequence, skipping elements that do not fit `T`.
/// Anything that is not an array becomes an empty vector.
pub fn vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Deserialize a name → count map, preserving key order.
/// Counts that are not numeric become `0`.
pub fn counts<'de, D>(deserializer: D) -> Result<IndexMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(map) = value else {
        return Ok(IndexMap::new());
    };
    Ok(map
        .into_iter()
        .map(|(key, count)| (key, number(&count).unwrap_or(0.0)))
        .collect())
}
