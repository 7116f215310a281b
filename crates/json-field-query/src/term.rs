//! `json` search terms and their SQL compilation.
//!
//! A domain leaf `["data", "json", ["->", "a", "->>", "b", "::INT", ">", 5]]`
//! compiles to `(("t"."data"->%s->>%s)::INT > %s)` with parameters
//! `["a", "b", 5]`.

use serde::Serialize;
use serde_json::Value;

use crate::types::{Cast, JsonOperator, KeyStep, TermOperator};
use crate::QueryError;

/// Domain operator naming a json term.
pub const JSON_TERM: &str = "json";

/// Parameterized SQL with `%s` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A parsed `json` term.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonTerm {
    pub field: String,
    pub steps: Vec<(JsonOperator, KeyStep)>,
    pub cast: Option<Cast>,
    pub operator: TermOperator,
    pub value: Value,
}

impl JsonTerm {
    /// Parses a whole domain leaf `[field, "json", elements]`.
    pub fn from_leaf(leaf: &Value) -> Result<Self, QueryError> {
        let parts = leaf.as_array().ok_or(QueryError::NotAJsonTerm)?;
        match parts.as_slice() {
            [Value::String(field), Value::String(op), Value::Array(elements)]
                if op == JSON_TERM =>
            {
                Self::from_parts(field, elements)
            }
            _ => Err(QueryError::NotAJsonTerm),
        }
    }

    /// Parses the right-hand element list of a term on `field`.
    ///
    /// Elements are JSON operators each followed by a key, an optional
    /// cast, the term operator, and finally the compared value.
    pub fn from_parts(field: &str, elements: &[Value]) -> Result<Self, QueryError> {
        if !is_identifier(field) {
            return Err(QueryError::InvalidField(field.to_string()));
        }
        let mut steps = Vec::new();
        let mut cast = None;
        let mut pending_op: Option<JsonOperator> = None;
        let mut iter = elements.iter().enumerate();

        let (operator, at) = loop {
            let Some((at, element)) = iter.next() else {
                return Err(QueryError::MissingOperator);
            };
            if let Some(op) = pending_op.take() {
                steps.push((op, key_step(element)?));
                continue;
            }
            let Value::String(token) = element else {
                return Err(QueryError::UnexpectedKey(element.to_string()));
            };
            if let Some(op) = JsonOperator::parse_str(token) {
                pending_op = Some(op);
            } else if let Some(c) = Cast::parse_str(token) {
                cast = Some(c);
            } else if let Some(op) = TermOperator::parse_str(token) {
                break (op, at);
            } else {
                return Err(QueryError::UnexpectedKey(token.clone()));
            }
        };

        let value = match &elements[at + 1..] {
            [] => return Err(QueryError::MissingValue),
            [value] => value.clone(),
            _ => return Err(QueryError::TrailingElements),
        };
        if operator.expects_list() && !value.is_array() {
            return Err(QueryError::ExpectedList);
        }
        Ok(Self {
            field: field.to_string(),
            steps,
            cast,
            operator,
            value,
        })
    }

    /// Builds a term that follows `path` into the column. With `text`, the
    /// last step extracts text (`->>`) instead of JSON.
    pub fn from_path<S: AsRef<str>>(
        field: &str,
        path: &[S],
        text: bool,
        cast: Option<Cast>,
        operator: TermOperator,
        value: Value,
    ) -> Result<Self, QueryError> {
        if path.is_empty() {
            return Err(QueryError::MissingOperator);
        }
        let last = path.len() - 1;
        let mut elements = Vec::with_capacity(path.len() * 2 + 3);
        for (i, key) in path.iter().enumerate() {
            let op = if text && i == last {
                JsonOperator::GetText
            } else {
                JsonOperator::Get
            };
            elements.push(Value::String(op.as_str().to_string()));
            elements.push(Value::String(key.as_ref().to_string()));
        }
        if let Some(cast) = cast {
            elements.push(Value::String(cast.as_str().to_string()));
        }
        elements.push(Value::String(operator_token(operator).to_string()));
        elements.push(value);
        Self::from_parts(field, &elements)
    }

    /// Like [`JsonTerm::from_path`], taking a row path as rendered by the
    /// tree editor (`"a..b"`).
    pub fn from_encoded_path(
        field: &str,
        encoded: &str,
        text: bool,
        cast: Option<Cast>,
        operator: TermOperator,
        value: Value,
    ) -> Result<Self, QueryError> {
        let path = json_field_path::decode_path(encoded)?;
        Self::from_path(field, &path, text, cast, operator, value)
    }

    /// Compiles against the table alias the query uses for the model.
    pub fn to_sql(&self, alias: &str) -> Result<SqlFragment, QueryError> {
        if !is_identifier(alias) {
            return Err(QueryError::InvalidAlias(alias.to_string()));
        }
        let mut sql = format!("((\"{alias}\".\"{}\"", self.field);
        let mut params = Vec::with_capacity(self.steps.len() + 1);
        for (op, key) in &self.steps {
            sql.push_str(op.as_str());
            sql.push_str("%s");
            params.push(key.to_param());
        }
        sql.push(')');
        if let Some(cast) = self.cast {
            sql.push_str(cast.as_str());
        }
        sql.push(' ');
        sql.push_str(self.operator.as_sql());
        sql.push_str(" %s)");
        params.push(self.value.clone());
        tracing::debug!(field = %self.field, sql = %sql, "compiled json term");
        Ok(SqlFragment { sql, params })
    }
}

fn key_step(element: &Value) -> Result<KeyStep, QueryError> {
    match element {
        Value::String(key) => Ok(KeyStep::Key(key.clone())),
        Value::Number(n) => n
            .as_i64()
            .map(KeyStep::Index)
            .ok_or_else(|| QueryError::InvalidElement(element.to_string())),
        other => Err(QueryError::InvalidElement(other.to_string())),
    }
}

fn operator_token(operator: TermOperator) -> &'static str {
    match operator {
        TermOperator::Eq => "=",
        TermOperator::Ne => "!=",
        TermOperator::Lt => "<",
        TermOperator::Le => "<=",
        TermOperator::Gt => ">",
        TermOperator::Ge => ">=",
        TermOperator::Like => "like",
        TermOperator::NotLike => "not like",
        TermOperator::ILike => "ilike",
        TermOperator::NotILike => "not ilike",
        TermOperator::In => "in",
        TermOperator::NotIn => "not in",
    }
}

/// Longest identifier PostgreSQL keeps without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

/// A plain SQL identifier: nothing in it can close the surrounding quotes.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
