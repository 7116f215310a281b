//! Schema validation seam and per-node projection of its errors.
//!
//! Validation is advisory: errors are data attached to the render plan and
//! never block an edit.

use std::collections::BTreeMap;

use json_field_path::{
    encode_path, format_structural_pointer, parse_structural_pointer, parse_value_pointer,
};
use jsonschema::error::ValidationErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::Schema;

/// One validator finding.
///
/// `path` is a structural JSON Pointer such as `/properties/a/properties/b`;
/// the empty string is the root. `schema_path` names the failing keyword
/// when the validator reports one (`/properties/a/minimum`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            schema_path: None,
        }
    }

    pub fn with_schema_path(mut self, schema_path: impl Into<String>) -> Self {
        self.schema_path = Some(schema_path.into());
        self
    }
}

/// External validator plugged into the editor.
pub trait Validator {
    fn validate(&self, value: &Value, schema: &Schema) -> Vec<ValidationError>;
}

/// Validator backed by the `jsonschema` crate, using the validator compiled
/// when the [`Schema`] was built.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl Validator for SchemaValidator {
    fn validate(&self, value: &Value, schema: &Schema) -> Vec<ValidationError> {
        let errors: Vec<ValidationError> = schema
            .compiled()
            .iter_errors(value)
            .map(|error| convert(&error))
            .collect();
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "value does not conform to schema");
        }
        errors
    }
}

/// A missing required property is reported on its parent object; move it
/// to the property itself so the row that lacks a value shows it.
fn convert(error: &jsonschema::ValidationError<'_>) -> ValidationError {
    let instance = error.instance_path.to_string();
    let path = match parse_value_pointer(&instance) {
        Ok(mut keys) => {
            if let ValidationErrorKind::Required { property } = &error.kind {
                if let Some(name) = property.as_str() {
                    keys.push(name.to_string());
                }
            }
            format_structural_pointer(&keys)
        }
        Err(_) => instance,
    };
    ValidationError::new(path, error.to_string()).with_schema_path(error.schema_path.to_string())
}

/// Errors grouped by encoded value path, plus those that map to no node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedErrors {
    pub by_path: BTreeMap<String, Vec<ValidationError>>,
    pub unmapped: Vec<ValidationError>,
}

impl ProjectedErrors {
    /// Takes the messages for one rendered node.
    pub fn take(&mut self, encoded_value_path: &str) -> Vec<String> {
        self.by_path
            .remove(encoded_value_path)
            .unwrap_or_default()
            .into_iter()
            .map(|error| error.message)
            .collect()
    }

    /// Everything not taken by a node, for display alongside the tree.
    pub fn into_remaining(self) -> Vec<ValidationError> {
        let mut remaining = self.unmapped;
        remaining.extend(self.by_path.into_values().flatten());
        remaining
    }
}

/// Groups errors by the value path their structural pointer governs, so
/// each can be attached to the row it concerns.
///
/// Keyword locations such as `/properties/a/minLength` and root errors
/// cannot be attached to a row and are kept aside.
pub fn project(errors: &[ValidationError]) -> ProjectedErrors {
    let mut projected = ProjectedErrors::default();
    for error in errors {
        match parse_structural_pointer(&error.path) {
            Ok(value_path) if !value_path.is_empty() => projected
                .by_path
                .entry(encode_path(&value_path))
                .or_default()
                .push(error.clone()),
            _ => projected.unmapped.push(error.clone()),
        }
    }
    projected
}
