//! Scalar leaves and nested data.
//!
//! A flattened state only ever stores [`Value`]s. Containers exist implicitly
//! through the keys of their descendants, and are reconstructed as [`Data`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A nested JSON tree: object, array, or scalar leaf.
pub type Data = serde_json::Value;

/// A JSON scalar stored at a leaf path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Finite number. Integers keep their integer representation.
    Number(serde_json::Number),
    /// UTF-8 string.
    String(String),
}

impl Value {
    /// Returns true if this is `null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the boolean if this is a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the number as `f64` if this is a number.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Get the number as `i64` if this is an integer that fits.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Get the string if this is a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the scalar kind, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Build a number leaf from a float. Returns `None` for NaN and infinities.
    pub fn from_f64(f: f64) -> Option<Self> {
        serde_json::Number::from_f64(f).map(Value::Number)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn data_type_name(v: &Data) -> &'static str {
    match v {
        Data::Null => "null",
        Data::Bool(_) => "boolean",
        Data::Number(_) => "number",
        Data::String(_) => "string",
        Data::Array(_) => "array",
        Data::Object(_) => "object",
    }
}

impl TryFrom<Data> for Value {
    type Error = String;

    fn try_from(data: Data) -> Result<Self, Self::Error> {
        match data {
            Data::Null => Ok(Value::Null),
            Data::Bool(b) => Ok(Value::Bool(b)),
            Data::Number(n) => Ok(Value::Number(n)),
            Data::String(s) => Ok(Value::String(s)),
            other => Err(format!(
                "expected a scalar leaf value, found {}",
                data_type_name(&other)
            )),
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Data::Null,
            Value::Bool(b) => Data::Bool(b),
            Value::Number(n) => Data::Number(n),
            Value::String(s) => Data::String(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Number(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(v.into())
    }
}

impl From<serde_json::Number> for Value {
    fn from(n: serde_json::Number) -> Self {
        Value::Number(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl PartialEq<Data> for Value {
    fn eq(&self, other: &Data) -> bool {
        match (self, other) {
            (Value::Null, Data::Null) => true,
            (Value::Bool(a), Data::Bool(b)) => a == b,
            (Value::Number(a), Data::Number(b)) => a == b,
            (Value::String(a), Data::String(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_serde_is_bare_scalar() {
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::from(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Value::from(10)).unwrap(), "10");
        assert_eq!(serde_json::to_string(&Value::from("hi")).unwrap(), "\"hi\"");

        let parsed: Value = serde_json::from_str("1.5").unwrap();
        assert_eq!(parsed.as_f64(), Some(1.5));
    }

    #[test]
    fn test_value_rejects_containers() {
        assert!(serde_json::from_str::<Value>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Value>("{\"a\": 1}").is_err());
    }

    #[test]
    fn test_value_data_conversions() {
        let v = Value::try_from(json!("bar")).unwrap();
        assert_eq!(v.as_str(), Some("bar"));
        assert_eq!(Data::from(v.clone()), json!("bar"));
        assert_eq!(v, json!("bar"));

        let err = Value::try_from(json!([1])).unwrap_err();
        assert!(err.contains("array"));
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        assert!(Value::from_f64(f64::NAN).is_none());
        assert!(Value::from_f64(f64::INFINITY).is_none());
        assert_eq!(Value::from_f64(2.5).and_then(|v| v.as_f64()), Some(2.5));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(1).type_name(), "number");
        assert_eq!(data_type_name(&json!({"a": 1})), "object");
        assert_eq!(data_type_name(&json!([])), "array");
    }

    #[test]
    fn test_option_into_value() {
        let none: Option<&str> = None;
        assert_eq!(Value::from(none), Value::Null);
        assert_eq!(Value::from(Some(3)), Value::from(3));
    }
}
