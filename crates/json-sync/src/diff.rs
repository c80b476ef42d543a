//! Minimal change lists between two flattened states.

use crate::{Change, FlattenedState};

/// Compute the ordered changes that turn `base` into `updated`.
///
/// Every key of `updated` whose leaf is new or different yields a Set, in
/// `updated`'s order. Then every key of `base` missing from `updated` yields
/// a Delete, in `base`'s order. Sets always precede Deletes.
///
/// An empty result means nothing observable changed.
///
/// # Examples
///
/// ```
/// use json_sync::{diff, flatten, Change};
/// use serde_json::json;
///
/// let base = flatten(&json!({"foo": "bar"})).unwrap();
/// let updated = flatten(&json!({"foo": "baz"})).unwrap();
///
/// assert_eq!(diff(&base, &updated), vec![Change::set("foo", "baz")]);
/// ```
pub fn diff(base: &FlattenedState, updated: &FlattenedState) -> Vec<Change> {
    let mut changes = Vec::new();

    for (path, value) in updated {
        if base.get(path) != Some(value) {
            changes.push(Change::set(path.clone(), value.clone()));
        }
    }

    for path in base.paths() {
        if !updated.contains(path) {
            changes.push(Change::delete(path));
        }
    }

    changes
}
