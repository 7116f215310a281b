//! Lock-step enumeration of a value tree and its optional schema tree.
//!
//! Nodes are addressed by their structural path. Without a schema the
//! structural path and the value path are the same; with one, every other
//! segment is a `properties` wrapper that the value does not have.

use json_field_path::{encode_path, get, Path};
use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::schema::{Schema, SchemaNode, PROPERTIES};

/// One child row of a container.
#[derive(Debug, Clone, PartialEq)]
pub struct Child<'s> {
    pub key: String,
    /// Rows for containers recurse; leaves render a value.
    pub is_container: bool,
    pub structural_path: Path,
    pub value_path: Path,
    /// The child's own schema node, when a schema governs the tree.
    pub schema: Option<SchemaNode<'s>>,
}

/// Drops the `properties` wrappers from a structural path.
pub fn value_path_of<S: AsRef<str>>(structural: &[S]) -> Path {
    structural
        .iter()
        .skip(1)
        .step_by(2)
        .map(|segment| segment.as_ref().to_string())
        .collect()
}

/// Inserts a `properties` wrapper before every key of a value path.
pub fn structural_path_of<S: AsRef<str>>(value_path: &[S]) -> Path {
    let mut out = Vec::with_capacity(value_path.len() * 2);
    for key in value_path {
        out.push(PROPERTIES.to_string());
        out.push(key.as_ref().to_string());
    }
    out
}

/// Lists the children of the node at `structural`, sorted by key.
///
/// Without a schema the node must be a mapping in `value`. With a schema,
/// keys come from the schema's `properties`, and any key present in the
/// value but not in the schema is a [`FieldError::StructuralMismatch`].
/// Absent or `null` value nodes are not an error in schema mode; they are
/// materialized by [`materialize`] when rendering for edit.
pub fn list_children<'s, S: AsRef<str>>(
    value: &Value,
    schema: Option<&'s Schema>,
    structural: &[S],
) -> Result<Vec<Child<'s>>, FieldError> {
    match schema {
        None => list_value_children(value, structural),
        Some(schema) => list_schema_children(value, schema, structural),
    }
}

fn list_value_children<'s, S: AsRef<str>>(
    value: &Value,
    path: &[S],
) -> Result<Vec<Child<'s>>, FieldError> {
    let node = get(value, path).ok_or_else(|| FieldError::not_found(path))?;
    let map = node
        .as_object()
        .ok_or_else(|| FieldError::not_a_container(path))?;
    let base: Path = path.iter().map(|s| s.as_ref().to_string()).collect();
    Ok(sorted_keys(map)
        .into_iter()
        .map(|key| {
            let mut child_path = base.clone();
            child_path.push(key.clone());
            Child {
                is_container: map.get(&key).is_some_and(json_field_path::is_container),
                structural_path: child_path.clone(),
                value_path: child_path,
                schema: None,
                key,
            }
        })
        .collect())
}

fn list_schema_children<'s, S: AsRef<str>>(
    value: &Value,
    schema: &'s Schema,
    structural: &[S],
) -> Result<Vec<Child<'s>>, FieldError> {
    let node = schema.node_at(structural)?;
    let value_path = value_path_of(structural);
    check_value_against(value, node, &value_path)?;

    let Some(properties) = node.properties() else {
        return Ok(Vec::new());
    };
    let base: Path = structural.iter().map(|s| s.as_ref().to_string()).collect();
    Ok(sorted_keys(properties)
        .into_iter()
        .filter_map(|key| {
            let child = node.property(&key)?;
            let mut structural_path = base.clone();
            structural_path.push(PROPERTIES.to_string());
            structural_path.push(key.clone());
            let mut child_value_path = value_path.clone();
            child_value_path.push(key.clone());
            Some(Child {
                key,
                is_container: child.is_object(),
                structural_path,
                value_path: child_value_path,
                schema: Some(child),
            })
        })
        .collect())
}

/// Every key the value holds at `value_path` must be declared by `node`.
fn check_value_against(
    value: &Value,
    node: SchemaNode<'_>,
    value_path: &[String],
) -> Result<(), FieldError> {
    match get(value, value_path) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Object(map)) => {
            let declared = node.properties();
            for key in map.keys() {
                if !declared.is_some_and(|props| props.contains_key(key)) {
                    return Err(FieldError::StructuralMismatch {
                        path: encode_path(value_path),
                        key: key.clone(),
                        reason: "is not declared by the schema",
                    });
                }
            }
            Ok(())
        }
        Some(_) => Err(FieldError::StructuralMismatch {
            path: encode_path(value_path),
            key: value_path.last().cloned().unwrap_or_default(),
            reason: "holds a scalar where the schema declares an object",
        }),
    }
}

fn sorted_keys(map: &Map<String, Value>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// Creates the node at `value_path` if it is absent, building missing
/// intermediate mappings on the way. New containers start as `{}`, new
/// leaves as `null`. Returns whether anything was created.
pub fn materialize<S: AsRef<str>>(
    value: &mut Value,
    value_path: &[S],
    is_container: bool,
) -> Result<bool, FieldError> {
    let mut changed = false;
    let mut node = value;
    for (depth, key) in value_path.iter().enumerate() {
        let key = key.as_ref();
        if node.is_null() {
            *node = Value::Object(Map::new());
            changed = true;
        }
        let map = node
            .as_object_mut()
            .ok_or_else(|| FieldError::not_a_container(&value_path[..depth]))?;
        let last = depth + 1 == value_path.len();
        if !map.contains_key(key) {
            let fresh = if last && !is_container {
                Value::Null
            } else {
                Value::Object(Map::new())
            };
            map.insert(key.to_string(), fresh);
            changed = true;
        }
        node = map
            .get_mut(key)
            .ok_or_else(|| FieldError::not_found(&value_path[..=depth]))?;
    }
    if is_container && node.is_null() {
        *node = Value::Object(Map::new());
        changed = true;
    }
    Ok(changed)
}
