//! Dotted-path access into a value tree
//!
//! Paths are dot-delimited segments (`"address.city"`, `"items.0.sku"`). A
//! path that exists verbatim as a key of the top-level map is used as that
//! key without splitting, so keys that contain dots stay addressable. This
//! means a literal dotted key shadows the nested path with the same spelling.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use crate::value::{Record, Value};

/// Borrow the value at `path`, if any.
///
/// An absent or empty path addresses the whole tree.
pub fn lookup<'a>(tree: &'a Value, path: Option<&str>) -> Option<&'a Value> {
    let path = match path {
        Some(p) if !p.is_empty() => p,
        _ => return Some(tree),
    };

    if let Some(found) = tree.as_map().and_then(|map| map.get(path)) {
        return Some(found);
    }

    path.split('.').try_fold(tree, |node, segment| match node {
        Value::Map(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Read the value at `path`, falling back to `default` when any segment is
/// missing.
pub fn get(tree: &Value, path: Option<&str>, default: Value) -> Value {
    lookup(tree, path).cloned().unwrap_or(default)
}

/// Write `value` at `path`, creating intermediate maps as needed.
///
/// An absent or empty path replaces the whole tree. Any non-map value met
/// on the way down is replaced by an empty map before descending, and its
/// previous contents are lost. Arrays are descended only through an index
/// that already exists.
pub fn set(tree: &mut Value, path: Option<&str>, value: Value) {
    let path = match path {
        Some(p) if !p.is_empty() => p,
        _ => {
            *tree = value;
            return;
        }
    };

    if let Some(slot) = tree.as_map_mut().and_then(|map| map.get_mut(path)) {
        *slot = value;
        return;
    }

    let segments: Vec<&str> = path.split('.').collect();
    set_segments(tree, &segments, value);
}

/// Owned variant of [`set`] returning the updated tree
pub fn with(mut tree: Value, path: Option<&str>, value: Value) -> Value {
    set(&mut tree, path, value);
    tree
}

fn set_segments(node: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if let Value::Array(items) = node {
        if let Some(slot) = head.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
            set_segments(slot, rest, value);
            return;
        }
    }

    if !matches!(node, Value::Map(_)) {
        *node = Value::Map(Record::new());
    }
    if let Value::Map(map) = node {
        set_segments(map.entry_or_null(head), rest, value);
    }
}
