use json_field_path::PathError;
use thiserror::Error;

/// Errors raised by tree walking and edit operations.
///
/// A failed operation never installs a new root and never moves the
/// pending key edit to another state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldError {
    /// Value and schema disagree on shape at `path` (encoded value path).
    #[error("structural mismatch at '{path}': key '{key}' {reason}")]
    StructuralMismatch {
        path: String,
        key: String,
        reason: &'static str,
    },
    #[error("key '{key}' already exists")]
    KeyCollision { key: String },
    #[error("key must not be empty")]
    EmptyKey,
    #[error("malformed path: {0}")]
    MalformedPath(#[from] PathError),
    #[error("no node at '{path}'")]
    NotFound { path: String },
    #[error("node at '{path}' is not a mapping")]
    NotAContainer { path: String },
    #[error("'{input}' is not a valid number")]
    InvalidNumber { input: String },
    #[error("a key edit is already in progress at '{path}'")]
    EditInProgress { path: String },
    #[error("no key edit in progress")]
    NoPendingEdit,
    #[error("pending key edit is at '{pending}', not '{requested}'")]
    PendingPathMismatch { pending: String, requested: String },
    #[error("keys are governed by the schema and cannot be edited")]
    SchemaGoverned,
    #[error("invalid schema at '{path}': {reason}")]
    InvalidSchema { path: String, reason: String },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FieldError {
    pub(crate) fn not_found<S: AsRef<str>>(path: &[S]) -> Self {
        FieldError::NotFound {
            path: json_field_path::encode_path(path),
        }
    }

    pub(crate) fn not_a_container<S: AsRef<str>>(path: &[S]) -> Self {
        FieldError::NotAContainer {
            path: json_field_path::encode_path(path),
        }
    }

    /// Whether the error is a rejected edit the UI should flag, as opposed
    /// to a broken interaction.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FieldError::KeyCollision { .. }
                | FieldError::EmptyKey
                | FieldError::InvalidNumber { .. }
                | FieldError::SchemaGoverned
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matrix() {
        assert_eq!(
            FieldError::KeyCollision { key: "b".into() }.to_string(),
            "key 'b' already exists"
        );
        assert_eq!(
            FieldError::MalformedPath(PathError::UnbalancedEscape { position: 2 }).to_string(),
            "malformed path: unbalanced escape at byte 2 in path string"
        );
        assert_eq!(
            FieldError::not_found(&["a", "b"]).to_string(),
            "no node at 'a..b'"
        );
    }

    #[test]
    fn path_errors_convert() {
        let err: FieldError = PathError::StraySeparator { position: 0 }.into();
        assert!(matches!(err, FieldError::MalformedPath(_)));
        assert!(!err.is_rejection());
        assert!(FieldError::EmptyKey.is_rejection());
    }
}
