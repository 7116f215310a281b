//! Path utilities for the json-field tree editor.
//!
//! A [`Path`] is an ordered list of string keys leading from the root of a
//! JSON value to one of its nodes. Three concerns live here:
//!
//! - [`codec`]: the double-dot display encoding round-tripped through
//!   rendered rows and interaction events (`"a..b/.c"` is `["a", "b.c"]`).
//! - [`pointer`]: instance and structural JSON Pointers, as reported by
//!   schema validators.
//! - [`find`]: read-only lookups of a path inside a `serde_json::Value`.

pub mod codec;
pub mod find;
pub mod pointer;

use thiserror::Error;

pub use codec::{decode_path, encode_key, encode_path, SEPARATOR};
pub use find::{get, get_mut, is_container};
pub use pointer::{
    format_structural_pointer, parse_structural_pointer, parse_value_pointer, PROPERTIES,
};

/// Ordered sequence of keys from the root to a node.
pub type Path = Vec<String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("unbalanced escape at byte {position} in path string")]
    UnbalancedEscape { position: usize },
    #[error("stray separator character at byte {position} in path string")]
    StraySeparator { position: usize },
    #[error("json pointer must be absolute or empty")]
    NotAbsolute,
    #[error("invalid '~' escape at byte {position} in json pointer")]
    BadPointerEscape { position: usize },
    #[error("'{pointer}' does not address a schema property")]
    NotStructural { pointer: String },
}

/// Builds an owned [`Path`] from anything yielding string-like keys.
///
/// ```
/// let p = json_field_path::path(["a", "b"]);
/// assert_eq!(p, vec!["a".to_string(), "b".to_string()]);
/// ```
pub fn path<I, S>(keys: I) -> Path
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(Into::into).collect()
}
