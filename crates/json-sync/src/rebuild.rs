//! Reconstruction of nested values from flattened leaves.
//!
//! Shape is inferred from key structure alone: a container whose immediate
//! child segments are all decimal integers comes back as an array, anything
//! else as an object. An object whose keys happen to be `"0"`, `"1"`, ...
//! therefore rebuilds as an array; flattened keys carry no discriminator.

use crate::path::{cmp_index, is_index, split_first, strip_parent};
use crate::{Data, FlattenedState, Value};
use indexmap::IndexMap;
use serde_json::Map;

/// Rebuild the value stored at `path`.
///
/// 1. A leaf stored exactly at `path` is returned as-is.
/// 2. Otherwise the immediate child segments below `path` are collected.
/// 3. No children: an empty array. A path that never existed and an empty
///    container look the same.
/// 4. All children are decimal indices: an array of the rebuilt children in
///    ascending numeric order, compacted (gaps are dropped, not filled).
/// 5. Otherwise an object mapping each child segment to its rebuilt value.
///
/// # Examples
///
/// ```
/// use json_sync::{flatten, rebuild};
/// use serde_json::json;
///
/// let state = flatten(&json!({"foo": "bar", "baz": {"bob": [1, 2]}})).unwrap();
///
/// assert_eq!(rebuild("foo", &state), json!("bar"));
/// assert_eq!(rebuild("baz", &state), json!({"bob": [1, 2]}));
/// assert_eq!(rebuild("missing", &state), json!([]));
/// ```
pub fn rebuild(path: &str, state: &FlattenedState) -> Data {
    if let Some(value) = state.get(path) {
        return Data::from(value.clone());
    }

    let below: Vec<(&str, &Value)> = state
        .iter()
        .filter_map(|(key, value)| strip_parent(key, path).map(|rest| (rest, value)))
        .collect();

    build(below)
}

/// Build a container from `(relative path, leaf)` pairs that all live below
/// the same parent.
fn build(entries: Vec<(&str, &Value)>) -> Data {
    if entries.is_empty() {
        return Data::Array(Vec::new());
    }

    // Group by first segment, keeping first-seen order.
    let mut children: IndexMap<&str, Child<'_>> = IndexMap::new();
    for (relative, value) in entries {
        let (head, tail) = split_first(relative);
        let child = children.entry(head).or_default();
        match tail {
            None => child.leaf = Some(value),
            Some(rest) => child.below.push((rest, value)),
        }
    }

    if children.keys().all(|segment| is_index(segment)) {
        let mut indexed: Vec<(&str, Child<'_>)> = children.into_iter().collect();
        indexed.sort_by(|(a, _), (b, _)| cmp_index(a, b));
        Data::Array(indexed.into_iter().map(|(_, child)| child.into_data()).collect())
    } else {
        let mut object = Map::with_capacity(children.len());
        for (segment, child) in children {
            object.insert(segment.to_owned(), child.into_data());
        }
        Data::Object(object)
    }
}

#[derive(Default)]
struct Child<'a> {
    /// Leaf stored exactly at this child's path. Wins over descendants.
    leaf: Option<&'a Value>,
    below: Vec<(&'a str, &'a Value)>,
}

impl Child<'_> {
    fn into_data(self) -> Data {
        match self.leaf {
            Some(value) => Data::from(value.clone()),
            None => build(self.below),
        }
    }
}
