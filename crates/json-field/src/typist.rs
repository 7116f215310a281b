//! Input kinds, value coercion on write and display formatting on read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::config::{format_date, EditorConfig};
use crate::error::FieldError;
use crate::schema::SchemaNode;

/// JSON type the stored value will take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Text,
    Number,
}

/// Widget kind a leaf renders with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Number,
    Integer,
    Date,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Number => "number",
            InputKind::Integer => "integer",
            InputKind::Date => "date",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, InputKind::Number | InputKind::Integer)
    }

    pub fn json_type(&self) -> JsonType {
        if self.is_numeric() {
            JsonType::Number
        } else {
            JsonType::Text
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub json_type: JsonType,
    pub input_kind: InputKind,
    pub required: bool,
}

/// Classifies the property `key` of `parent`, the schema node governing
/// the value at `parent_path`.
///
/// `"null"` members of a type union are ignored. A union that still names
/// more than one type, or any type other than `string`, `number` and
/// `integer`, falls back to plain text.
pub fn classify<S: AsRef<str>>(
    parent: SchemaNode<'_>,
    parent_path: &[S],
    key: &str,
) -> Result<Classification, FieldError> {
    let node = parent
        .property(key)
        .ok_or_else(|| FieldError::StructuralMismatch {
            path: json_field_path::encode_path(parent_path),
            key: key.to_string(),
            reason: "is not declared by the schema",
        })?;
    let input_kind = match node.non_null_types().as_slice() {
        ["string"] if node.format() == Some("date") => InputKind::Date,
        ["number"] => InputKind::Number,
        ["integer"] => InputKind::Integer,
        _ => InputKind::Text,
    };
    Ok(Classification {
        json_type: input_kind.json_type(),
        input_kind,
        required: parent.is_required(key),
    })
}

/// Converts raw widget input into the value to store.
///
/// Empty input always stores `null`. Numeric kinds parse the input as a
/// signed, then unsigned 64-bit integer before trying a float; an integer
/// input must not carry a fractional part.
pub fn coerce(raw: &str, kind: InputKind) -> Result<Value, FieldError> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    if !kind.is_numeric() {
        return Ok(Value::String(raw.to_string()));
    }
    let trimmed = raw.trim();
    let invalid = || FieldError::InvalidNumber {
        input: raw.to_string(),
    };
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::Number(n.into()));
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Ok(Value::Number(n.into()));
    }
    let f = trimmed.parse::<f64>().map_err(|_| invalid())?;
    if kind == InputKind::Integer {
        if f.fract() != 0.0 || f.abs() >= i64::MAX as f64 {
            return Err(invalid());
        }
        return Ok(Value::Number((f as i64).into()));
    }
    Number::from_f64(f).map(Value::Number).ok_or_else(invalid)
}

/// Text shown for a leaf value.
///
/// In read mode a date leaf holding a parseable stored date is reformatted
/// with the display pattern. Edit mode shows stored text unchanged so it
/// round-trips to the form the schema expects. A pattern chrono cannot
/// apply also leaves the stored text as it is.
pub fn display(value: &Value, kind: InputKind, read_mode: bool, config: &EditorConfig) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) if read_mode && kind == InputKind::Date => {
            NaiveDate::parse_from_str(s, &config.date_storage_format)
                .ok()
                .and_then(|date| format_date(date, &config.date_display_format))
                .unwrap_or_else(|| s.clone())
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
