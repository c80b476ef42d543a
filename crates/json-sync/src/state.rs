//! Flat, path-keyed state snapshots.
//!
//! A `FlattenedState` stores only leaves. A container exists exactly when at
//! least one key uses its path as a dotted prefix; an empty container leaves
//! no trace at all.

use crate::Value;
use indexmap::map::{IntoIter, Iter};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Mapping from dotted path to scalar leaf, in insertion order.
///
/// Serializes as a flat JSON object, which is the full-snapshot format used
/// to seed a receiver.
///
/// # Examples
///
/// ```
/// use json_sync::{FlattenedState, Value};
///
/// let mut state = FlattenedState::new();
/// state.insert("baz.bob", true);
/// state.insert("foo", "bar");
///
/// assert_eq!(state.len(), 2);
/// assert_eq!(state.get("foo"), Some(&Value::from("bar")));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlattenedState {
    entries: IndexMap<String, Value>,
}

impl FlattenedState {
    /// Create an empty state.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty state with room for `capacity` leaves.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Get the leaf stored exactly at `path`.
    #[inline]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries.get(path)
    }

    /// Returns true if a leaf is stored exactly at `path`.
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Insert or overwrite a leaf. New keys go to the end; overwritten keys
    /// keep their position. Returns the previous leaf, if any.
    #[inline]
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(path.into(), value.into())
    }

    /// Remove a leaf, keeping the relative order of the remaining keys.
    #[inline]
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        self.entries.shift_remove(path)
    }

    /// Number of leaves.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no leaves.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(path, leaf)` pairs in order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Iterate over leaf paths in order.
    #[inline]
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Remove every leaf.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<(String, Value)> for FlattenedState {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, Value)> for FlattenedState {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for FlattenedState {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a FlattenedState {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position_on_overwrite() {
        let mut state = FlattenedState::new();
        state.insert("a", 1);
        state.insert("b", 2);
        let prev = state.insert("a", 3);

        assert_eq!(prev, Some(Value::from(1)));
        assert_eq!(state.paths().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(state.get("a"), Some(&Value::from(3)));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut state: FlattenedState = ["a", "b", "c"]
            .iter()
            .map(|k| (k.to_string(), Value::Null))
            .collect();

        assert!(state.remove("b").is_some());
        assert!(state.remove("b").is_none());
        assert_eq!(state.paths().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_serde_is_flat_object() {
        let mut state = FlattenedState::new();
        state.insert("foo", "bar");
        state.insert("baz.0", Value::Null);

        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"foo":"bar","baz.0":null}"#);

        let parsed: FlattenedState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_serde_rejects_nested_values() {
        let result = serde_json::from_str::<FlattenedState>(r#"{"foo":{"bar":1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = FlattenedState::new();
        a.insert("x", 1);
        a.insert("y", 2);
        let mut b = FlattenedState::new();
        b.insert("y", 2);
        b.insert("x", 1);
        assert_eq!(a, b);
    }
}
