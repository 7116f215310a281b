//! Lookups of a key path inside a JSON value.
//!
//! Only mappings are descended into. Arrays are leaves for the tree editor,
//! so a path segment never indexes into one.

use serde_json::Value;

/// Returns the node at `path`, or `None` if any segment is missing or
/// crosses a non-mapping value.
pub fn get<'a, S: AsRef<str>>(value: &'a Value, path: &[S]) -> Option<&'a Value> {
    let mut node = value;
    for key in path {
        node = node.as_object()?.get(key.as_ref())?;
    }
    Some(node)
}

/// Mutable counterpart of [`get`].
pub fn get_mut<'a, S: AsRef<str>>(value: &'a mut Value, path: &[S]) -> Option<&'a mut Value> {
    let mut node = value;
    for key in path {
        node = node.as_object_mut()?.get_mut(key.as_ref())?;
    }
    Some(node)
}

/// Whether a value renders as a container row: a mapping, never an array.
pub fn is_container(value: &Value) -> bool {
    value.is_object()
}
