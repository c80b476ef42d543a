//! Change application and touched-path computation.

use crate::{Change, FlattenedState};
use std::collections::BTreeSet;

/// Apply a change list to a flattened state in place, strictly in order.
///
/// Delete removes the leaf if present and is a no-op otherwise. Set inserts
/// or overwrites. No shape validation is done: a Set on `a` while `a.b`
/// exists is written through as-is.
///
/// # Examples
///
/// ```
/// use json_sync::{apply_changes, flatten, Change, Value};
/// use serde_json::json;
///
/// let mut state = flatten(&json!({"count": 0, "old": true})).unwrap();
/// apply_changes(&mut state, &[Change::set("count", 10), Change::delete("old")]);
///
/// assert_eq!(state.get("count"), Some(&Value::from(10)));
/// assert!(!state.contains("old"));
/// ```
pub fn apply_changes(state: &mut FlattenedState, changes: &[Change]) {
    for change in changes {
        apply_change(state, change);
    }
}

/// Apply a single change (mutating).
pub(crate) fn apply_change(state: &mut FlattenedState, change: &Change) {
    match change {
        Change::Set { path, value } => {
            state.insert(path.clone(), value.clone());
        }
        Change::Delete { path } => {
            state.remove(path);
        }
    }
}

/// Collect the distinct paths a change list touches.
///
/// ```
/// use json_sync::{touched_paths, Change};
///
/// let changes = [Change::set("a.b", 1), Change::delete("a.b"), Change::set("c", 2)];
/// let touched = touched_paths(&changes);
/// assert_eq!(touched.into_iter().collect::<Vec<_>>(), vec!["a.b", "c"]);
/// ```
pub fn touched_paths(changes: &[Change]) -> BTreeSet<&str> {
    changes.iter().map(Change::path).collect()
}
