//! Tokens of a `json` search term.

use std::fmt;

use serde_json::Value;

/// PostgreSQL JSON extraction operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonOperator {
    /// `->`: extract as JSON.
    Get,
    /// `->>`: extract as text.
    GetText,
}

impl JsonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonOperator::Get => "->",
            JsonOperator::GetText => "->>",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "->" => Some(JsonOperator::Get),
            "->>" => Some(JsonOperator::GetText),
            _ => None,
        }
    }
}

/// Cast applied to the extracted value before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    Int,
    Date,
}

impl Cast {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cast::Int => "::INT",
            Cast::Date => "::DATE",
        }
    }

    /// Case-insensitive: `::int` and `::INT` are the same cast.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "::INT" => Some(Cast::Int),
            "::DATE" => Some(Cast::Date),
            _ => None,
        }
    }
}

/// Comparison closing the term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    ILike,
    NotILike,
    In,
    NotIn,
}

impl TermOperator {
    /// Domain spelling. `<>` is read as `!=`, `=like` and `=ilike` as
    /// their plain forms.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "=" => Some(TermOperator::Eq),
            "!=" | "<>" => Some(TermOperator::Ne),
            "<" => Some(TermOperator::Lt),
            "<=" => Some(TermOperator::Le),
            ">" => Some(TermOperator::Gt),
            ">=" => Some(TermOperator::Ge),
            "like" | "=like" => Some(TermOperator::Like),
            "not like" => Some(TermOperator::NotLike),
            "ilike" | "=ilike" => Some(TermOperator::ILike),
            "not ilike" => Some(TermOperator::NotILike),
            "in" => Some(TermOperator::In),
            "not in" => Some(TermOperator::NotIn),
            _ => None,
        }
    }

    /// SQL spelling.
    pub fn as_sql(&self) -> &'static str {
        match self {
            TermOperator::Eq => "=",
            TermOperator::Ne => "!=",
            TermOperator::Lt => "<",
            TermOperator::Le => "<=",
            TermOperator::Gt => ">",
            TermOperator::Ge => ">=",
            TermOperator::Like => "LIKE",
            TermOperator::NotLike => "NOT LIKE",
            TermOperator::ILike => "ILIKE",
            TermOperator::NotILike => "NOT ILIKE",
            TermOperator::In => "IN",
            TermOperator::NotIn => "NOT IN",
        }
    }

    pub fn expects_list(&self) -> bool {
        matches!(self, TermOperator::In | TermOperator::NotIn)
    }
}

/// Key step inside a JSON column: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStep {
    Key(String),
    Index(i64),
}

impl KeyStep {
    pub fn to_param(&self) -> Value {
        match self {
            KeyStep::Key(key) => Value::String(key.clone()),
            KeyStep::Index(index) => Value::from(*index),
        }
    }
}

impl fmt::Display for KeyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStep::Key(k) => f.write_str(k),
            KeyStep::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for KeyStep {
    fn from(value: &str) -> Self {
        KeyStep::Key(value.to_string())
    }
}

impl From<String> for KeyStep {
    fn from(value: String) -> Self {
        KeyStep::Key(value)
    }
}

impl From<i64> for KeyStep {
    fn from(value: i64) -> Self {
        KeyStep::Index(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_is_case_insensitive() {
        assert_eq!(Cast::parse_str("::int"), Some(Cast::Int));
        assert_eq!(Cast::parse_str("::Date"), Some(Cast::Date));
        assert_eq!(Cast::parse_str("::text"), None);
    }

    #[test]
    fn operator_aliases() {
        assert_eq!(TermOperator::parse_str("<>"), Some(TermOperator::Ne));
        assert_eq!(TermOperator::parse_str("=ilike"), Some(TermOperator::ILike));
        assert_eq!(TermOperator::parse_str("child_of"), None);
        assert_eq!(TermOperator::NotIn.as_sql(), "NOT IN");
        assert!(TermOperator::In.expects_list());
    }

    #[test]
    fn json_operators() {
        assert_eq!(JsonOperator::parse_str("->>"), Some(JsonOperator::GetText));
        assert_eq!(JsonOperator::Get.as_str(), "->");
        assert_eq!(JsonOperator::parse_str("#>"), None);
    }
}
