//! Leaf-level change instructions and their wire format.
//!
//! A change list is an ordered sequence; applying it out of order can give a
//! different result, so transports must preserve it end-to-end.

use crate::{SyncResult, Value};
use serde::{Deserialize, Serialize};

/// A single leaf mutation.
///
/// Serializes as `{"$":"S","p":<path>,"v":<scalar>}` or
/// `{"$":"D","p":<path>}`. Removing a whole subtree takes one `Delete` per
/// leaf; there is no container-level instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$")]
pub enum Change {
    /// Insert or overwrite the leaf at `path`.
    #[serde(rename = "S")]
    Set {
        /// The path of the leaf that was set.
        #[serde(rename = "p")]
        path: String,
        /// The value the leaf was set to.
        #[serde(rename = "v")]
        value: Value,
    },

    /// Remove the leaf at `path`. No-op if absent.
    #[serde(rename = "D")]
    Delete {
        /// The path of the leaf that was deleted.
        #[serde(rename = "p")]
        path: String,
    },
}

impl Change {
    /// Create a Set change.
    #[inline]
    pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Change::Set {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a Delete change.
    #[inline]
    pub fn delete(path: impl Into<String>) -> Self {
        Change::Delete { path: path.into() }
    }

    /// Get the path this change targets.
    #[inline]
    pub fn path(&self) -> &str {
        match self {
            Change::Set { path, .. } => path,
            Change::Delete { path } => path,
        }
    }

    /// Get the value of a Set change.
    #[inline]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Change::Set { value, .. } => Some(value),
            Change::Delete { .. } => None,
        }
    }

    /// Returns true for a Set change.
    #[inline]
    pub fn is_set(&self) -> bool {
        matches!(self, Change::Set { .. })
    }

    /// Returns true for a Delete change.
    #[inline]
    pub fn is_delete(&self) -> bool {
        matches!(self, Change::Delete { .. })
    }

    /// Get the wire tag.
    #[inline]
    pub fn tag(&self) -> &'static str {
        match self {
            Change::Set { .. } => "S",
            Change::Delete { .. } => "D",
        }
    }
}

/// Encode a change list as a JSON array.
pub fn encode_changes(changes: &[Change]) -> SyncResult<String> {
    Ok(serde_json::to_string(changes)?)
}

/// Decode a change list from a JSON array, preserving order.
pub fn decode_changes(json: &str) -> SyncResult<Vec<Change>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_constructors() {
        let set = Change::set("foo", "baz");
        assert_eq!(set.tag(), "S");
        assert_eq!(set.path(), "foo");
        assert_eq!(set.value(), Some(&Value::from("baz")));
        assert!(set.is_set());

        let del = Change::delete("baz.3");
        assert_eq!(del.tag(), "D");
        assert_eq!(del.value(), None);
        assert!(del.is_delete());
    }

    #[test]
    fn test_wire_shape() {
        let set = serde_json::to_value(Change::set("foo", "baz")).unwrap();
        assert_eq!(set, json!({"$": "S", "p": "foo", "v": "baz"}));

        let del = serde_json::to_value(Change::delete("baz.2")).unwrap();
        assert_eq!(del, json!({"$": "D", "p": "baz.2"}));

        let null_set = serde_json::to_value(Change::set("x", Value::Null)).unwrap();
        assert_eq!(null_set, json!({"$": "S", "p": "x", "v": null}));
    }

    #[test]
    fn test_encode_decode_preserves_order() {
        let changes = vec![
            Change::set("b", 1),
            Change::set("a", true),
            Change::delete("c"),
        ];
        let encoded = encode_changes(&changes).unwrap();
        assert_eq!(decode_changes(&encoded).unwrap(), changes);
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        assert!(decode_changes(r#"[{"$":"X","p":"a"}]"#).is_err());
    }

    #[test]
    fn test_decode_rejects_container_value() {
        assert!(decode_changes(r#"[{"$":"S","p":"a","v":{"b":1}}]"#).is_err());
    }
}
