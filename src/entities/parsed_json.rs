use crate::entities::units::{SizeBase, datasize_as_human, duration_human};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An owned, immutable snapshot of one mapping from the probe report.
///
/// Every entity keeps the sub-document it was built from. The getters here are the
/// "get with an overridable default" accessors: they never fail, and fall back to
/// the supplied `default` when a key is absent or its value does not convert.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedJson(Map<String, Value>);

impl ParsedJson {
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wraps `value` if it is a mapping; anything else becomes an empty snapshot.
    pub fn from_value_lossy(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys of the snapshot, in document order.
    pub fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a string value, or `default` if `key` is absent or not a string.
    pub fn get_str(&self, key: &str, default: Option<&str>) -> Option<String> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .or(default)
            .map(str::to_owned)
    }

    /// Returns `key` as a float. Accepts JSON numbers and numeric strings (ffprobe prints most
    /// numbers as strings).
    pub fn get_as_f64(&self, key: &str, default: Option<f64>) -> Option<f64> {
        self.0.get(key).and_then(value_as_f64).or(default)
    }

    /// Returns `key` as an integer. Accepts JSON integers, integer strings, and JSON floats,
    /// which are truncated toward zero.
    pub fn get_as_i64(&self, key: &str, default: Option<i64>) -> Option<i64> {
        self.0.get(key).and_then(value_as_i64).or(default)
    }

    /// Looks up `name` in the nested `tags` mapping.
    pub fn get_tag(&self, name: &str, default: Option<&str>) -> Option<String> {
        self.0
            .get("tags")
            .and_then(|tags| tags.get(name))
            .and_then(Value::as_str)
            .or(default)
            .map(str::to_owned)
    }

    /// Returns the nested `tags` mapping, or an empty one.
    pub fn tags(&self) -> Map<String, Value> {
        self.0
            .get("tags")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// Reads a flag from the nested `disposition` mapping (`1` means set).
    pub fn get_disposition(&self, name: &str) -> Option<bool> {
        self.0
            .get("disposition")
            .and_then(|d| d.get(name))
            .and_then(value_as_i64)
            .map(|flag| flag != 0)
    }

    /// Formats the numeric value of `key` as a human-readable data size, e.g. `"567.8 MB"`.
    pub fn get_datasize_as_human(
        &self,
        key: &str,
        suffix: &str,
        default: Option<String>,
        base: SizeBase,
    ) -> Option<String> {
        self.get_as_f64(key, None)
            .and_then(|num| datasize_as_human(num, suffix, base))
            .or(default)
    }

    /// Formats the `duration` key as `HH:MM:SS.ss`.
    pub fn get_duration_as_human(&self, default: Option<String>) -> Option<String> {
        self.get_as_f64("duration", None)
            .and_then(duration_human)
            .or(default)
    }
}

impl From<Map<String, Value>> for ParsedJson {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Getter names every entity inherits from [`ParsedJson`].
pub const BASE_GETTER_NAMES: &[&str] = &[
    "get",
    "get_as_f64",
    "get_as_i64",
    "get_datasize_as_human",
    "get_disposition",
    "get_duration_as_human",
    "get_str",
    "get_tag",
];

pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub(crate) fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
