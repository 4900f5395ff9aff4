//! Typed structured fields
//!
//! Records carry their fields as an ordered sequence of `(key, value)` pairs so
//! console output is deterministic and follows insertion order. Keys may repeat;
//! lookups and JSON decoding see the last write.

use super::log_entry::ErrorValue;
use std::fmt;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Strs(Vec<String>),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Errs(Vec<ErrorValue>),
    Object(Fields),
    Json(serde_json::Value),
    Null,
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::Strs(list) => {
                Value::Array(list.iter().cloned().map(Value::String).collect())
            }
            FieldValue::Int(i) => Value::Number((*i).into()),
            FieldValue::Uint(u) => Value::Number((*u).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Errs(errs) => {
                Value::Array(errs.iter().map(ErrorValue::to_json_value).collect())
            }
            FieldValue::Object(fields) => fields.to_json_value(),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Null => Value::Null,
        }
    }

    /// Rebuild a field value from its JSON form.
    ///
    /// Scalars map back to their typed variant; arrays and objects stay JSON.
    #[must_use]
    pub fn from_json_value(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::String(s) => FieldValue::Str(s),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::Uint(u)
                } else {
                    n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null)
                }
            }
            other => FieldValue::Json(other),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
            other => write!(f, "{}", other.to_json_value()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(list: Vec<String>) -> Self {
        FieldValue::Strs(list)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Fields> for FieldValue {
    fn from(fields: Fields) -> Self {
        FieldValue::Object(fields)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Json(v)
    }
}

/// Ordered key/value fields attached to a record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a field (builder form)
    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.push(key, value);
        self
    }

    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.entries.push((key.into(), value.into()));
    }

    pub fn extend(&mut self, other: &Fields) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Last value written under `key`
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object view; repeated keys keep the last value
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.entries {
            map.insert(key.clone(), value.to_json_value());
        }
        serde_json::Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.push(k, v);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_creation() {
        let fields = Fields::new();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_fields_preserve_insertion_order() {
        let fields = Fields::new()
            .with_field("zeta", 1)
            .with_field("alpha", "a")
            .with_field("mid", true);

        let keys: Vec<_> = fields.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_repeated_key_last_write_visible() {
        let fields = Fields::new()
            .with_field("attempt", 1)
            .with_field("attempt", 2);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("attempt"), Some(&FieldValue::Int(2)));
        assert_eq!(fields.to_json_value()["attempt"], 2);
    }

    #[test]
    fn test_display_values() {
        assert_eq!(FieldValue::from("plain").to_string(), "plain");
        assert_eq!(FieldValue::from(42).to_string(), "42");
        assert_eq!(
            FieldValue::from(vec!["a".to_string(), "b".to_string()]).to_string(),
            r#"["a","b"]"#
        );
        let nested = Fields::new().with_field("k", "v");
        assert_eq!(FieldValue::from(nested).to_string(), r#"{"k":"v"}"#);
    }

    #[test]
    fn test_from_json_value_scalars() {
        assert_eq!(
            FieldValue::from_json_value(serde_json::json!(-3)),
            FieldValue::Int(-3)
        );
        assert_eq!(
            FieldValue::from_json_value(serde_json::json!(u64::MAX)),
            FieldValue::Uint(u64::MAX)
        );
        assert_eq!(
            FieldValue::from_json_value(serde_json::json!(1.5)),
            FieldValue::Float(1.5)
        );
        assert!(matches!(
            FieldValue::from_json_value(serde_json::json!(["x"])),
            FieldValue::Json(_)
        ));
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(FieldValue::Float(f64::NAN).to_json_value(), serde_json::Value::Null);
    }
}
