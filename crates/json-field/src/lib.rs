//! Schema-aware tree editing core for JSON form fields.
//!
//! The host supplies the current value and an optional JSON-Schema-like
//! descriptor. [`render::plan`] flattens them into ordered rows, and the
//! functions in [`edit`] turn a row interaction (identified by its encoded
//! path) into a new root value. [`FieldEditor`] bundles both with the
//! pending key edit slot for a single editing session.
//!
//! ```
//! use json_field::{FieldEditor, RenderMode};
//! use serde_json::json;
//!
//! let mut editor = FieldEditor::new(json!({"a": {"b": 1}}), None);
//! let rows = editor.render(RenderMode::Edit);
//! assert_eq!(rows.nodes[1].path, "a..b");
//!
//! editor.set_value("a..b", "2").unwrap();
//! assert_eq!(editor.value(), &json!({"a": {"b": "2"}}));
//! ```

pub mod config;
pub mod edit;
pub mod editor;
pub mod error;
pub mod render;
pub mod schema;
pub mod typist;
pub mod validate;
pub mod walker;

pub use config::EditorConfig;
pub use edit::{AddedKey, KeyEditState, PendingKeyEdit};
pub use editor::{ChangeEvent, FieldEditor, ListenerId};
pub use error::FieldError;
pub use render::{Mismatch, RenderMode, RenderNode, RenderPlan};
pub use schema::{Schema, SchemaNode};
pub use typist::{Classification, InputKind, JsonType};
pub use validate::{SchemaValidator, ValidationError, Validator};
pub use walker::Child;

pub use json_field_path::{decode_path, encode_path, Path};
