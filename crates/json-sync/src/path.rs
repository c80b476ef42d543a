//! Dotted path helpers.
//!
//! Paths are plain strings: segments joined with `.`, array elements
//! addressed by their decimal index (`"users.0.name"`). The root is the
//! empty string, and a top-level key carries no leading separator.

use std::cmp::Ordering;

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Join a parent path and a child segment.
///
/// # Examples
///
/// ```
/// use json_sync::path::join;
///
/// assert_eq!(join("", "users"), "users");
/// assert_eq!(join("users", "0"), "users.0");
/// ```
#[inline]
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        return child.to_owned();
    }
    let mut path = String::with_capacity(parent.len() + 1 + child.len());
    path.push_str(parent);
    path.push(SEPARATOR);
    path.push_str(child);
    path
}

/// Strip `parent` (and the following separator) from `key`.
///
/// Returns the remainder when `key` is strictly below `parent`, `None`
/// otherwise. Every key is below the root.
#[inline]
pub fn strip_parent<'a>(key: &'a str, parent: &str) -> Option<&'a str> {
    if parent.is_empty() {
        return Some(key);
    }
    key.strip_prefix(parent)?.strip_prefix(SEPARATOR)
}

/// Split a relative path into its first segment and the rest, if any.
#[inline]
pub fn split_first(relative: &str) -> (&str, Option<&str>) {
    match relative.split_once(SEPARATOR) {
        Some((head, tail)) => (head, Some(tail)),
        None => (relative, None),
    }
}

/// Returns true if `segment` is a non-negative base-10 integer.
///
/// Only ASCII digits qualify; signs, whitespace and the empty string do not.
#[inline]
pub fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Compare two index segments by numeric value without parsing them.
///
/// Works for arbitrarily long digit strings. Equal values with different
/// spellings (`"7"`, `"007"`) fall back to string order.
pub fn cmp_index(a: &str, b: &str) -> Ordering {
    let ta = a.trim_start_matches('0');
    let tb = b.trim_start_matches('0');
    ta.len()
        .cmp(&tb.len())
        .then_with(|| ta.cmp(tb))
        .then_with(|| a.cmp(b))
}

/// Returns true if `prefix` names `path` itself or one of its ancestors,
/// respecting segment boundaries.
///
/// ```
/// use json_sync::path::is_segment_prefix;
///
/// assert!(is_segment_prefix("baz", "baz.bob"));
/// assert!(is_segment_prefix("baz", "baz"));
/// assert!(is_segment_prefix("", "baz"));
/// assert!(!is_segment_prefix("ba", "baz.bob"));
/// ```
#[inline]
pub fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Construct a dotted path from a sequence of segments.
///
/// Each segment is formatted with `Display`, so numbers become index
/// segments.
///
/// # Examples
///
/// ```
/// use json_sync::path;
///
/// assert_eq!(path!(), "");
/// assert_eq!(path!("users", 0, "name"), "users.0.name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        ::std::string::String::new()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = ::std::string::String::new();
        $(
            p = $crate::path::join(&p, &::std::string::ToString::to_string(&$seg));
        )+
        p
    }};
}
