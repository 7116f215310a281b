//! Copy-on-write edit operations and the pending key edit state machine.
//!
//! Every operation borrows the current root and returns a fresh one. The
//! borrowed root is never touched, and an `Err` leaves the caller with its
//! old root and its old [`KeyEditState`].

use json_field_path::{encode_path, get, get_mut, Path};
use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::typist::{coerce, InputKind};

/// A key being typed: the placeholder's path and the value to restore if
/// the edit is abandoned.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingKeyEdit {
    pub path: Path,
    pub saved_value: Value,
}

impl PendingKeyEdit {
    /// Whether the edit names a freshly added (empty) key.
    pub fn is_new_key(&self) -> bool {
        self.path.last().is_some_and(|key| key.is_empty())
    }

    pub fn encoded_path(&self) -> String {
        encode_path(&self.path)
    }
}

/// Result of [`add_key`].
#[derive(Debug, Clone, PartialEq)]
pub struct AddedKey {
    pub value: Value,
    pub pending: PendingKeyEdit,
}

/// Inserts an empty placeholder key under the node at `path`.
///
/// A mapping gets `"": ""` added. Any other node, including the root, is
/// replaced by the one-entry mapping `{"": ""}` and its old value is kept in
/// the pending edit.
pub fn add_key(root: &Value, path: &[String]) -> Result<AddedKey, FieldError> {
    let node = get(root, path).ok_or_else(|| FieldError::not_found(path))?;
    let saved_value = node.clone();
    if let Some(map) = node.as_object() {
        if map.contains_key("") {
            return Err(FieldError::KeyCollision { key: String::new() });
        }
    }

    let mut next = root.clone();
    let target = get_mut(&mut next, path).ok_or_else(|| FieldError::not_found(path))?;
    match target {
        Value::Object(map) => {
            map.insert(String::new(), Value::String(String::new()));
        }
        other => *other = placeholder_mapping(),
    }

    let mut pending_path = path.to_vec();
    pending_path.push(String::new());
    tracing::debug!(path = %encode_path(&pending_path), "added placeholder key");
    Ok(AddedKey {
        value: next,
        pending: PendingKeyEdit {
            path: pending_path,
            saved_value,
        },
    })
}

fn placeholder_mapping() -> Value {
    let mut map = Map::new();
    map.insert(String::new(), Value::String(String::new()));
    Value::Object(map)
}

/// Renames the last key of `path` to `new_key` inside its parent mapping.
///
/// An empty `new_key` and a `new_key` already held by a sibling are
/// rejected; renaming a key to itself returns the root unchanged.
pub fn rename_key(root: &Value, path: &[String], new_key: &str) -> Result<Value, FieldError> {
    let (old_key, parent_path) = split_last(path)?;
    if new_key.is_empty() {
        return Err(FieldError::EmptyKey);
    }
    let parent = parent_map(root, parent_path)?;
    if !parent.contains_key(old_key) {
        return Err(FieldError::not_found(path));
    }
    if new_key == old_key {
        return Ok(root.clone());
    }
    if parent.contains_key(new_key) {
        return Err(FieldError::KeyCollision {
            key: new_key.to_string(),
        });
    }

    let mut next = root.clone();
    let parent = parent_map_mut(&mut next, parent_path)?;
    let moved = parent
        .remove(old_key)
        .ok_or_else(|| FieldError::not_found(path))?;
    parent.insert(new_key.to_string(), moved);
    tracing::debug!(path = %encode_path(path), new_key, "renamed key");
    Ok(next)
}

/// Undoes the placeholder of a new-key edit; other edits leave the value
/// as it is.
///
/// The saved value goes back at the parent of the pending path. When that
/// parent is the root, the saved value becomes the whole new root.
pub fn abandon_key_edit(root: &Value, pending: &PendingKeyEdit) -> Result<Value, FieldError> {
    if !pending.is_new_key() {
        return Ok(root.clone());
    }
    let parent_path = &pending.path[..pending.path.len() - 1];
    if parent_path.is_empty() {
        return Ok(pending.saved_value.clone());
    }
    let mut next = root.clone();
    let slot = get_mut(&mut next, parent_path).ok_or_else(|| FieldError::not_found(parent_path))?;
    *slot = pending.saved_value.clone();
    tracing::debug!(path = %encode_path(parent_path), "restored value after abandoned key");
    Ok(next)
}

/// Removes the last key of `path` from its parent mapping.
pub fn delete_key(root: &Value, path: &[String]) -> Result<Value, FieldError> {
    let (key, parent_path) = split_last(path)?;
    if !parent_map(root, parent_path)?.contains_key(key) {
        return Err(FieldError::not_found(path));
    }
    let mut next = root.clone();
    parent_map_mut(&mut next, parent_path)?.remove(key);
    tracing::debug!(path = %encode_path(path), "deleted key");
    Ok(next)
}

/// Stores coerced widget input at `path`.
///
/// Missing (or `null`) intermediate nodes are created as empty mappings;
/// crossing any other non-mapping value is an error.
pub fn set_value(
    root: &Value,
    path: &[String],
    raw: &str,
    kind: InputKind,
) -> Result<Value, FieldError> {
    let (key, parent_path) = split_last(path)?;
    let stored = coerce(raw, kind)?;

    let mut next = root.clone();
    let mut node = &mut next;
    for (depth, segment) in parent_path.iter().enumerate() {
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        let map = node
            .as_object_mut()
            .ok_or_else(|| FieldError::not_a_container(&parent_path[..depth]))?;
        node = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    let map = node
        .as_object_mut()
        .ok_or_else(|| FieldError::not_a_container(parent_path))?;
    map.insert(key.clone(), stored);
    tracing::debug!(path = %encode_path(path), kind = kind.as_str(), "set value");
    Ok(next)
}

fn split_last(path: &[String]) -> Result<(&String, &[String]), FieldError> {
    path.split_last()
        .ok_or_else(|| FieldError::NotFound { path: String::new() })
}

fn parent_map<'a>(root: &'a Value, parent_path: &[String]) -> Result<&'a Map<String, Value>, FieldError> {
    get(root, parent_path)
        .ok_or_else(|| FieldError::not_found(parent_path))?
        .as_object()
        .ok_or_else(|| FieldError::not_a_container(parent_path))
}

fn parent_map_mut<'a>(
    root: &'a mut Value,
    parent_path: &[String],
) -> Result<&'a mut Map<String, Value>, FieldError> {
    get_mut(root, parent_path)
        .ok_or_else(|| FieldError::not_found(parent_path))?
        .as_object_mut()
        .ok_or_else(|| FieldError::not_a_container(parent_path))
}

/// The single pending key edit slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum KeyEditState {
    #[default]
    Idle,
    EditingKey(PendingKeyEdit),
}

impl KeyEditState {
    pub fn pending(&self) -> Option<&PendingKeyEdit> {
        match self {
            KeyEditState::Idle => None,
            KeyEditState::EditingKey(pending) => Some(pending),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, KeyEditState::Idle)
    }

    /// Fails fast when an edit is already open.
    pub fn ensure_idle(&self) -> Result<(), FieldError> {
        match self {
            KeyEditState::Idle => Ok(()),
            KeyEditState::EditingKey(pending) => Err(FieldError::EditInProgress {
                path: pending.encoded_path(),
            }),
        }
    }

    /// Idle → EditingKey with a fresh placeholder key.
    pub fn begin_add(&mut self, root: &Value, path: &[String]) -> Result<Value, FieldError> {
        self.ensure_idle()?;
        let added = add_key(root, path)?;
        *self = KeyEditState::EditingKey(added.pending);
        Ok(added.value)
    }

    /// Idle → EditingKey for a key that already exists.
    pub fn begin_rename(&mut self, root: &Value, path: &[String]) -> Result<(), FieldError> {
        self.ensure_idle()?;
        let current = get(root, path).ok_or_else(|| FieldError::not_found(path))?;
        if path.is_empty() {
            return Err(FieldError::NotFound { path: String::new() });
        }
        *self = KeyEditState::EditingKey(PendingKeyEdit {
            path: path.to_vec(),
            saved_value: current.clone(),
        });
        Ok(())
    }

    /// EditingKey → Idle on success. Rejections keep the edit open.
    pub fn commit_rename(
        &mut self,
        root: &Value,
        path: &[String],
        new_key: &str,
    ) -> Result<Value, FieldError> {
        self.expect_pending(path)?;
        let next = rename_key(root, path, new_key)?;
        *self = KeyEditState::Idle;
        Ok(next)
    }

    /// EditingKey → Idle, restoring the saved value for a new key.
    pub fn abandon(&mut self, root: &Value, path: &[String]) -> Result<Value, FieldError> {
        let pending = self.expect_pending(path)?;
        let next = abandon_key_edit(root, pending)?;
        *self = KeyEditState::Idle;
        Ok(next)
    }

    fn expect_pending(&self, path: &[String]) -> Result<&PendingKeyEdit, FieldError> {
        let pending = self.pending().ok_or(FieldError::NoPendingEdit)?;
        if pending.path != path {
            return Err(FieldError::PendingPathMismatch {
                pending: pending.encoded_path(),
                requested: encode_path(path),
            });
        }
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use json_field_path::path;
    use serde_json::json;

    #[test]
    fn add_key_on_mapping() {
        let doc = json!({"a": {"x": 1}});
        let added = add_key(&doc, &path(["a"])).unwrap();
        assert_eq!(added.value, json!({"a": {"x": 1, "": ""}}));
        assert_eq!(added.pending.path, path(["a", ""]));
        assert_eq!(added.pending.saved_value, json!({"x": 1}));
        assert_eq!(doc, json!({"a": {"x": 1}}));
    }

    #[test]
    fn add_key_on_leaf_converts_it() {
        let doc = json!({"a": 5});
        let added = add_key(&doc, &path(["a"])).unwrap();
        assert_eq!(added.value, json!({"a": {"": ""}}));
        assert_eq!(added.pending.path, path(["a", ""]));
        assert_eq!(added.pending.saved_value, json!(5));
    }

    #[test]
    fn add_key_on_root_scalar() {
        let added = add_key(&json!(null), &[]).unwrap();
        assert_eq!(added.value, json!({"": ""}));
        assert_eq!(added.pending.path, path([""]));
        let restored = abandon_key_edit(&added.value, &added.pending).unwrap();
        assert_eq!(restored, json!(null));
    }

    #[test]
    fn add_key_twice_collides() {
        let doc = json!({"": "", "a": 1});
        assert_eq!(
            add_key(&doc, &[]),
            Err(FieldError::KeyCollision { key: String::new() })
        );
    }

    #[test]
    fn rename_moves_value() {
        let doc = json!({"a": {"x": 1}, "b": 2});
        let next = rename_key(&doc, &path(["a"]), "c").unwrap();
        assert_eq!(next, json!({"c": {"x": 1}, "b": 2}));
        assert_eq!(doc, json!({"a": {"x": 1}, "b": 2}));
    }

    #[test]
    fn rename_rejections() {
        let doc = json!({"a": 1, "b": 2});
        assert_eq!(
            rename_key(&doc, &path(["a"]), "b"),
            Err(FieldError::KeyCollision { key: "b".into() })
        );
        assert_eq!(rename_key(&doc, &path(["a"]), ""), Err(FieldError::EmptyKey));
        assert_eq!(rename_key(&doc, &path(["a"]), "a").unwrap(), doc);
        assert!(matches!(
            rename_key(&doc, &path(["zz"]), "q"),
            Err(FieldError::NotFound { .. })
        ));
    }

    #[test]
    fn abandon_existing_key_is_noop() {
        let doc = json!({"a": 1});
        let pending = PendingKeyEdit {
            path: path(["a"]),
            saved_value: json!(1),
        };
        assert_eq!(abandon_key_edit(&doc, &pending).unwrap(), doc);
    }

    #[test]
    fn delete_nested_key() {
        let doc = json!({"a": {"b": 1, "c": 2}});
        let next = delete_key(&doc, &path(["a", "b"])).unwrap();
        assert_eq!(next, json!({"a": {"c": 2}}));
        assert_eq!(doc, json!({"a": {"b": 1, "c": 2}}));
        assert!(matches!(
            delete_key(&doc, &path(["a", "zz"])),
            Err(FieldError::NotFound { .. })
        ));
    }

    #[test]
    fn set_value_coerces_and_builds() {
        assert_eq!(
            set_value(&json!({}), &path(["x"]), "42", InputKind::Number).unwrap(),
            json!({"x": 42})
        );
        assert_eq!(
            set_value(&json!({}), &path(["x"]), "", InputKind::Text).unwrap(),
            json!({"x": null})
        );
        assert_eq!(
            set_value(&json!({"a": null}), &path(["a", "b", "c"]), "v", InputKind::Text).unwrap(),
            json!({"a": {"b": {"c": "v"}}})
        );
        assert_eq!(
            set_value(&json!(null), &path(["x"]), "1", InputKind::Text).unwrap(),
            json!({"x": "1"})
        );
    }

    #[test]
    fn set_value_failures_leave_no_trace() {
        let doc = json!({"a": 3});
        assert!(matches!(
            set_value(&doc, &path(["a", "b"]), "v", InputKind::Text),
            Err(FieldError::NotAContainer { .. })
        ));
        assert!(matches!(
            set_value(&doc, &path(["n"]), "x", InputKind::Number),
            Err(FieldError::InvalidNumber { .. })
        ));
        assert!(set_value(&doc, &[], "v", InputKind::Text).is_err());
        assert_eq!(doc, json!({"a": 3}));
    }

    #[test]
    fn state_machine_add_then_rename() {
        let mut state = KeyEditState::default();
        let doc = json!({"a": 1});
        let doc = state.begin_add(&doc, &[]).unwrap();
        assert_eq!(state.pending().unwrap().path, path([""]));

        assert!(matches!(
            state.begin_add(&doc, &[]),
            Err(FieldError::EditInProgress { .. })
        ));
        assert_eq!(
            state.commit_rename(&doc, &path([""]), "a"),
            Err(FieldError::KeyCollision { key: "a".into() })
        );
        assert!(!state.is_idle());

        let doc = state.commit_rename(&doc, &path([""]), "b").unwrap();
        assert!(state.is_idle());
        assert_eq!(doc, json!({"a": 1, "b": ""}));
    }

    #[test]
    fn state_machine_abandon_restores() {
        let mut state = KeyEditState::default();
        let original = json!({"a": {"x": 1}});
        let doc = state.begin_add(&original, &path(["a"])).unwrap();
        assert!(matches!(
            state.abandon(&doc, &path(["a"])),
            Err(FieldError::PendingPathMismatch { .. })
        ));
        let doc = state.abandon(&doc, &path(["a", ""])).unwrap();
        assert_eq!(doc, original);
        assert!(state.is_idle());
        assert_eq!(state.abandon(&doc, &path(["a", ""])), Err(FieldError::NoPendingEdit));
    }

    #[test]
    fn state_machine_rename_existing() {
        let mut state = KeyEditState::default();
        let doc = json!({"a": 1});
        state.begin_rename(&doc, &path(["a"])).unwrap();
        let same = state.abandon(&doc, &path(["a"])).unwrap();
        assert_eq!(same, doc);
        assert!(state.is_idle());
        assert!(state.begin_rename(&doc, &[]).is_err());
        assert!(state.is_idle());
    }
}
