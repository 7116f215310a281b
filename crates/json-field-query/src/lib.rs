//! Search terms on JSON columns.
//!
//! Hosts that store the edited value in a `jsonb` column filter records with
//! a `json` domain term. This crate parses such terms and compiles them into
//! parameterized SQL for PostgreSQL.

pub mod term;
pub mod types;

use json_field_path::PathError;
use thiserror::Error;

pub use term::{JsonTerm, SqlFragment, JSON_TERM};
pub use types::{Cast, JsonOperator, KeyStep, TermOperator};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("not a json domain term")]
    NotAJsonTerm,
    #[error("invalid field name '{0}'")]
    InvalidField(String),
    #[error("invalid table alias '{0}'")]
    InvalidAlias(String),
    #[error("json term has no comparison operator")]
    MissingOperator,
    #[error("json term has no value to compare with")]
    MissingValue,
    #[error("unexpected elements after the compared value")]
    TrailingElements,
    #[error("'{0}' is not a json operator, cast or comparison")]
    UnexpectedKey(String),
    #[error("{0} cannot be used as a key")]
    InvalidElement(String),
    #[error("'in' comparisons need a list value")]
    ExpectedList,
    #[error("malformed path: {0}")]
    Path(#[from] PathError),
}
