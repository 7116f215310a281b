//! One editing session of a JSON form field.
//!
//! The editor holds the current value, the optional schema and the pending
//! key edit slot. Interaction handlers take encoded path strings as carried
//! by rendered rows, decode them, run the matching copy-on-write operation
//! and install the new root only when the operation succeeds.

use json_field_path::{decode_path, encode_path};
use serde_json::Value;

use crate::config::EditorConfig;
use crate::edit::{self, KeyEditState, PendingKeyEdit};
use crate::error::FieldError;
use crate::render::{plan, RenderMode, RenderPlan};
use crate::schema::Schema;
use crate::typist::{classify, InputKind};
use crate::validate::{SchemaValidator, ValidationError, Validator};
use crate::walker::structural_path_of;

pub type ListenerId = u64;

/// Emitted after every change of the root value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub before: Value,
    pub after: Value,
}

type Listener = Box<dyn FnMut(&ChangeEvent)>;

pub struct FieldEditor {
    value: Value,
    schema: Option<Schema>,
    config: EditorConfig,
    state: KeyEditState,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: ListenerId,
}

impl std::fmt::Debug for FieldEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldEditor")
            .field("value", &self.value)
            .field("schema", &self.schema)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FieldEditor {
    pub fn new(value: Value, schema: Option<Schema>) -> Self {
        Self {
            value,
            schema,
            config: EditorConfig::default(),
            state: KeyEditState::Idle,
            listeners: Vec::new(),
            next_listener: 1,
        }
    }

    pub fn with_config(mut self, config: EditorConfig) -> Result<Self, FieldError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn pending(&self) -> Option<&PendingKeyEdit> {
        self.state.pending()
    }

    /// Replaces value and schema wholesale, dropping any pending key edit.
    /// Listeners are not notified; the host is the source of the change.
    pub fn reset(&mut self, value: Value, schema: Option<Schema>) {
        if let Some(pending) = self.state.pending() {
            tracing::debug!(
                path = %pending.encoded_path(),
                "dropping pending key edit on reset"
            );
        }
        self.value = value;
        self.schema = schema;
        self.state = KeyEditState::Idle;
    }

    pub fn on_change<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn off_change(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Validates with the `jsonschema`-backed validator. Without a schema
    /// there is nothing to check.
    pub fn validate(&self) -> Vec<ValidationError> {
        self.validate_with(&SchemaValidator)
    }

    pub fn validate_with(&self, validator: &dyn Validator) -> Vec<ValidationError> {
        match &self.schema {
            Some(schema) => validator.validate(&self.value, schema),
            None => Vec::new(),
        }
    }

    /// Plans one render pass, validating with the built-in validator.
    ///
    /// In edit mode under a schema, absent nodes are created and installed
    /// as the new value (listeners see the change) before validation, so
    /// the plan's errors describe the value it shows.
    pub fn render(&mut self, mode: RenderMode) -> RenderPlan {
        if mode == RenderMode::Edit && self.schema.is_some() {
            let built = plan(&self.value, self.schema.as_ref(), mode, &[], &self.config);
            if let Some(next) = built.materialized {
                self.install(next);
            }
        }
        let errors = self.validate();
        self.render_with_errors(mode, &errors)
    }

    /// Plans one render pass with errors produced by an external validator.
    /// Nodes created for an edit pass are installed as the new value.
    pub fn render_with_errors(
        &mut self,
        mode: RenderMode,
        errors: &[ValidationError],
    ) -> RenderPlan {
        let rendered = plan(&self.value, self.schema.as_ref(), mode, errors, &self.config);
        if let Some(next) = &rendered.materialized {
            self.install(next.clone());
        }
        rendered
    }

    /// Adds an empty key under the row at `path` (`None` is the root) and
    /// opens a key edit for it. Returns the encoded path of the new key.
    pub fn add_key(&mut self, path: Option<&str>) -> Result<String, FieldError> {
        self.ensure_key_edits_allowed()?;
        let path = decode_path(path.unwrap_or_default())?;
        let next = self.state.begin_add(&self.value, &path)?;
        self.install(next);
        Ok(self
            .state
            .pending()
            .map(PendingKeyEdit::encoded_path)
            .unwrap_or_default())
    }

    /// Opens a key edit for an existing key.
    pub fn begin_rename(&mut self, path: &str) -> Result<(), FieldError> {
        self.ensure_key_edits_allowed()?;
        let path = decode_path(path)?;
        self.state.begin_rename(&self.value, &path)
    }

    /// Commits the pending key edit at `path` under `new_key`.
    ///
    /// An empty or colliding key is rejected and the edit stays open.
    pub fn rename_key(&mut self, path: &str, new_key: &str) -> Result<(), FieldError> {
        let path = decode_path(path)?;
        match self.state.commit_rename(&self.value, &path, new_key) {
            Ok(next) => {
                self.install(next);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    path = %encode_path(&path),
                    new_key,
                    error = %err,
                    "rename rejected"
                );
                Err(err)
            }
        }
    }

    /// Closes the pending key edit at `path` without a new name.
    pub fn abandon_key_edit(&mut self, path: &str) -> Result<(), FieldError> {
        let path = decode_path(path)?;
        let next = self.state.abandon(&self.value, &path)?;
        self.install(next);
        Ok(())
    }

    pub fn delete_key(&mut self, path: &str) -> Result<(), FieldError> {
        self.ensure_key_edits_allowed()?;
        self.state.ensure_idle()?;
        let path = decode_path(path)?;
        let next = edit::delete_key(&self.value, &path)?;
        self.install(next);
        Ok(())
    }

    /// Stores raw widget input at `path`, coerced by the input kind the
    /// schema assigns to that leaf (plain text without a schema).
    pub fn set_value(&mut self, path: &str, raw: &str) -> Result<(), FieldError> {
        self.state.ensure_idle()?;
        let path = decode_path(path)?;
        let kind = self.input_kind_at(&path)?;
        match edit::set_value(&self.value, &path, raw, kind) {
            Ok(next) => {
                self.install(next);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(path = %encode_path(&path), error = %err, "value rejected");
                Err(err)
            }
        }
    }

    fn input_kind_at(&self, path: &[String]) -> Result<InputKind, FieldError> {
        let Some(schema) = &self.schema else {
            return Ok(InputKind::Text);
        };
        let Some((key, parent)) = path.split_last() else {
            return Err(FieldError::NotFound {
                path: String::new(),
            });
        };
        let parent_node = schema.node_at(&structural_path_of(parent))?;
        Ok(classify(parent_node, parent, key)?.input_kind)
    }

    fn ensure_key_edits_allowed(&self) -> Result<(), FieldError> {
        if self.schema.is_some() {
            tracing::warn!("key edit refused: schema governs the keys");
            return Err(FieldError::SchemaGoverned);
        }
        Ok(())
    }

    fn install(&mut self, next: Value) {
        if next == self.value {
            return;
        }
        let before = std::mem::replace(&mut self.value, next);
        let event = ChangeEvent {
            before,
            after: self.value.clone(),
        };
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}
