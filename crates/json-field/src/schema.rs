//! Read-only view over a JSON-Schema-like descriptor.
//!
//! The editor interprets the `object` subset: `type` (a name or a union of
//! names), `properties`, `required` and `format`. Nested properties sit one
//! level deeper than the value they describe, behind a `properties` wrapper,
//! so schema lookups take a structural path. The whole descriptor is also
//! compiled with `jsonschema` for validation.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::walker::value_path_of;

pub use json_field_path::PROPERTIES;

/// An owned schema tree and its compiled validator.
#[derive(Clone)]
pub struct Schema {
    root: Value,
    compiled: Arc<jsonschema::Validator>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("root", &self.root).finish()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Schema {
    /// Wraps and compiles a schema tree. The root must be a mapping that
    /// `jsonschema` accepts; `format` keywords are asserted, not annotated.
    pub fn new(root: Value) -> Result<Self, FieldError> {
        if !root.is_object() {
            return Err(FieldError::InvalidSchema {
                path: String::new(),
                reason: "schema root must be an object".to_string(),
            });
        }
        let compiled = jsonschema::options()
            .should_validate_formats(true)
            .build(&root)
            .map_err(|err| FieldError::InvalidSchema {
                path: err.schema_path.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            root,
            compiled: Arc::new(compiled),
        })
    }

    /// Interprets a host-supplied schema slot, where `null` and `false`
    /// mean "no schema".
    pub fn from_field(value: Value) -> Result<Option<Self>, FieldError> {
        match value {
            Value::Null | Value::Bool(false) => Ok(None),
            other => Self::new(other).map(Some),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub(crate) fn compiled(&self) -> &jsonschema::Validator {
        &self.compiled
    }

    pub fn root(&self) -> SchemaNode<'_> {
        SchemaNode { node: &self.root }
    }

    /// Resolves a structural path (`["properties", "a", "properties", "b"]`).
    ///
    /// A missing segment is a structural mismatch: every key the editor
    /// reaches must be declared by the schema.
    pub fn node_at<S: AsRef<str>>(&self, structural: &[S]) -> Result<SchemaNode<'_>, FieldError> {
        let mut node = &self.root;
        for (depth, segment) in structural.iter().enumerate() {
            let segment = segment.as_ref();
            match node.as_object().and_then(|m| m.get(segment)) {
                Some(next) => node = next,
                None => {
                    let parent = value_path_of(&structural[..depth]);
                    return Err(FieldError::StructuralMismatch {
                        path: json_field_path::encode_path(&parent),
                        key: segment.to_string(),
                        reason: "is not declared by the schema",
                    });
                }
            }
        }
        Ok(SchemaNode { node })
    }
}

/// Borrowed schema node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaNode<'a> {
    node: &'a Value,
}

impl<'a> SchemaNode<'a> {
    pub fn as_value(&self) -> &'a Value {
        self.node
    }

    /// Declared type names, in declaration order.
    pub fn type_names(&self) -> Vec<&'a str> {
        match self.node.get("type") {
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Declared type names without the nullable `"null"` member.
    pub fn non_null_types(&self) -> Vec<&'a str> {
        self.type_names()
            .into_iter()
            .filter(|name| *name != "null")
            .collect()
    }

    pub fn is_nullable(&self) -> bool {
        self.type_names().contains(&"null")
    }

    /// Whether rows for this node recurse into children.
    pub fn is_object(&self) -> bool {
        self.non_null_types() == ["object"]
    }

    pub fn format(&self) -> Option<&'a str> {
        self.node.get("format").and_then(Value::as_str)
    }

    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.node.get(PROPERTIES).and_then(Value::as_object)
    }

    pub fn property(&self, key: &str) -> Option<SchemaNode<'a>> {
        self.properties()?.get(key).map(|node| SchemaNode { node })
    }

    pub fn required(&self) -> impl Iterator<Item = &'a str> {
        self.node
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required().any(|name| name == key)
    }
}
