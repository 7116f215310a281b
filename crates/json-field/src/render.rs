//! Flattened, ordered render plan for one pass over the tree.
//!
//! Rows come out depth-first, pre-order: a container's row, then its
//! children, which is the order an indented table is drawn in.

use json_field_path::{encode_path, get};
use serde::Serialize;
use serde_json::Value;

use crate::config::EditorConfig;
use crate::error::FieldError;
use crate::schema::Schema;
use crate::typist::{classify, display, InputKind};
use crate::validate::{project, ProjectedErrors, ValidationError};
use crate::walker::{list_children, materialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Read,
    Edit,
}

/// Per-row render instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub key: String,
    /// Encoded value path, carried back by interaction events.
    pub path: String,
    pub depth: usize,
    pub is_container: bool,
    /// Widget for leaves; `None` for containers.
    pub input_kind: Option<InputKind>,
    pub required: bool,
    /// Stored value for leaves; `None` for containers and absent leaves.
    pub value: Option<Value>,
    pub display: String,
    /// Whether add/rename/delete controls are offered on this row. Keys
    /// under a schema are fixed by its `properties`.
    pub key_editable: bool,
    /// Validation messages attached to this row.
    pub errors: Vec<String>,
    /// Set when this container's subtree could not be rendered.
    pub mismatch: Option<String>,
}

/// A subtree that was skipped because value and schema disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderPlan {
    pub nodes: Vec<RenderNode>,
    /// Validation errors not attached to any row.
    pub errors: Vec<ValidationError>,
    pub mismatches: Vec<Mismatch>,
    /// The value with absent schema nodes created, when rendering for edit
    /// created any.
    pub materialized: Option<Value>,
}

/// Builds the render plan for `value` under an optional `schema`.
///
/// A structural mismatch only drops the subtree it was found in; the rest
/// of the tree is still planned.
pub fn plan(
    value: &Value,
    schema: Option<&Schema>,
    mode: RenderMode,
    errors: &[ValidationError],
    config: &EditorConfig,
) -> RenderPlan {
    let build = mode == RenderMode::Edit && schema.is_some();
    let mut planner = Planner {
        working: value.clone(),
        schema,
        build,
        read_mode: mode == RenderMode::Read,
        key_editable: mode == RenderMode::Edit && schema.is_none(),
        config,
        errors: project(errors),
        nodes: Vec::new(),
        mismatches: Vec::new(),
    };

    let renderable = match schema {
        Some(_) => true,
        None => value.is_object(),
    };
    if renderable {
        if build {
            if let Err(err) = materialize::<String>(&mut planner.working, &[], true) {
                planner.record_mismatch(&[], &err);
            }
        }
        if let Err(err) = planner.visit(&[], 0) {
            planner.record_mismatch(&[], &err);
        }
    }

    let materialized = (build && planner.working != *value).then_some(planner.working);
    RenderPlan {
        nodes: planner.nodes,
        errors: planner.errors.into_remaining(),
        mismatches: planner.mismatches,
        materialized,
    }
}

struct Planner<'a> {
    working: Value,
    schema: Option<&'a Schema>,
    build: bool,
    read_mode: bool,
    key_editable: bool,
    config: &'a EditorConfig,
    errors: ProjectedErrors,
    nodes: Vec<RenderNode>,
    mismatches: Vec<Mismatch>,
}

impl Planner<'_> {
    fn visit(&mut self, structural: &[String], depth: usize) -> Result<(), FieldError> {
        let children = list_children(&self.working, self.schema, structural)?;
        let parent = match self.schema {
            Some(schema) => Some(schema.node_at(structural)?),
            None => None,
        };

        for child in children {
            if self.build {
                let created =
                    materialize(&mut self.working, &child.value_path, child.is_container);
                if let Err(err) = created {
                    self.record_mismatch(&child.value_path, &err);
                    continue;
                }
            }
            let classification = match parent {
                Some(parent) => {
                    let parent_path = &child.value_path[..child.value_path.len() - 1];
                    Some(classify(parent, parent_path, &child.key)?)
                }
                None => None,
            };
            let path = encode_path(&child.value_path);
            let errors = self.errors.take(&path);

            let (input_kind, value, display_text) = if child.is_container {
                (None, None, String::new())
            } else {
                let kind = classification.map_or(InputKind::Text, |c| c.input_kind);
                let value = get(&self.working, &child.value_path).cloned();
                let text = value
                    .as_ref()
                    .map(|v| display(v, kind, self.read_mode, self.config))
                    .unwrap_or_default();
                (Some(kind), value, text)
            };

            self.nodes.push(RenderNode {
                key: child.key,
                path,
                depth,
                is_container: child.is_container,
                input_kind,
                required: classification.is_some_and(|c| c.required),
                value,
                display: display_text,
                key_editable: self.key_editable,
                errors,
                mismatch: None,
            });

            if child.is_container {
                let row = self.nodes.len() - 1;
                if let Err(err) = self.visit(&child.structural_path, depth + 1) {
                    self.nodes[row].mismatch = Some(err.to_string());
                    self.record_mismatch(&child.value_path, &err);
                }
            }
        }
        Ok(())
    }

    fn record_mismatch(&mut self, value_path: &[String], err: &FieldError) {
        let path = encode_path(value_path);
        tracing::warn!(path = %path, error = %err, "skipping subtree");
        self.mismatches.push(Mismatch {
            path,
            message: err.to_string(),
        });
    }
}
