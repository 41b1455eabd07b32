//! Tolerant decoding of backend payloads.
//!
//! The Revalio backend is not consistent about types: ids come back as numbers
//! on one endpoint and strings on another, counters are sometimes strings, and
//! lists occasionally carry junk elements. Everything in here turns that into
//! well-typed values without ever failing on a single bad field.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod coerce;
pub mod timestamp;

/// A backend identifier in its canonical string form.
///
/// `42` and `"42"` normalize to the same id, so ownership checks and lookups
/// never trip over numeric/string mismatches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads an id out of an arbitrary JSON value. `null`, empty strings,
    /// booleans, arrays and objects are not ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            Value::Number(n) => Some(Self(number_text(n))),
            _ => None,
        }
    }

    /// Accepts an id taken from a URL path. Only ids that are safe to splice
    /// back into a backend URL are allowed.
    pub fn from_path_segment(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= 64
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `42.0` reads as `42` so float-encoded ids match their integer spelling.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        EntityId::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("not an id: {value}")))
    }
}

/// Deserializes a list, dropping elements that do not decode as `T`.
///
/// `null` or a missing field becomes an empty list, and so does any other
/// non-array value (PHP backends send `{}` for an empty collection). Use with
/// `#[serde(default, deserialize_with = "lenient_list")]`.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(decode_each(items)),
        Value::Null => Ok(Vec::new()),
        other => {
            tracing::warn!(value = %other, "expected a list, treating as empty");
            Ok(Vec::new())
        }
    }
}

static NULL: Value = Value::Null;

/// The first candidate that is present and not `null`.
///
/// Backend records sometimes carry the same attribute under two spellings
/// (`likes_count` and `likeCount`); callers list them in priority order.
pub fn first_present<'a, const N: usize>(candidates: [&'a Value; N]) -> &'a Value {
    candidates
        .into_iter()
        .find(|v| !v.is_null())
        .unwrap_or(&NULL)
}

/// Decodes each element independently; bad elements are logged and skipped.
pub fn decode_each<T>(values: Vec<Value>) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
{
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(index, error = %e, "dropping undecodable list element");
                None
            }
        })
        .collect()
}

/// A list response that is either a bare array or wrapped as `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope {
    Bare(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

impl ListEnvelope {
    pub fn into_items<T>(self) -> Vec<T>
    where
        T: serde::de::DeserializeOwned,
    {
        match self {
            ListEnvelope::Bare(data) | ListEnvelope::Wrapped { data } => decode_each(data),
        }
    }
}

/// JS-style truthiness for "has the viewer liked this" style flags.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}
