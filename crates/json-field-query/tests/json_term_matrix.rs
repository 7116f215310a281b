//! Compilation matrix for json search terms.

use json_field_path::encode_path;
use json_field_query::{Cast, JsonTerm, QueryError, TermOperator};
use serde_json::json;

// ---------------------------------------------------------------------------
// Domain leaves
// ---------------------------------------------------------------------------

#[test]
fn single_text_extraction() {
    let term = JsonTerm::from_leaf(&json!(["meta", "json", ["->>", "color", "=", "red"]])).unwrap();
    let fragment = term.to_sql("product").unwrap();
    assert_eq!(fragment.sql, "((\"product\".\"meta\"->>%s) = %s)");
    assert_eq!(fragment.params, vec![json!("color"), json!("red")]);
}

#[test]
fn date_cast_comparison() {
    let term = JsonTerm::from_leaf(&json!([
        "meta", "json", ["->>", "since", "::DATE", ">=", "2024-01-01"]
    ]))
    .unwrap();
    assert_eq!(
        term.to_sql("t").unwrap().sql,
        "((\"t\".\"meta\"->>%s)::DATE >= %s)"
    );
}

#[test]
fn in_takes_the_whole_list_as_one_parameter() {
    let term = JsonTerm::from_leaf(&json!(["meta", "json", ["->>", "tag", "not in", ["a", "b"]]]))
        .unwrap();
    let fragment = term.to_sql("t").unwrap();
    assert_eq!(fragment.sql, "((\"t\".\"meta\"->>%s) NOT IN %s)");
    assert_eq!(fragment.params, vec![json!("tag"), json!(["a", "b"])]);
}

#[test]
fn alias_operators_compile_to_canonical_sql() {
    let term = JsonTerm::from_leaf(&json!(["meta", "json", ["->>", "n", "=ilike", "%x%"]])).unwrap();
    assert_eq!(term.operator, TermOperator::ILike);
    assert!(term.to_sql("t").unwrap().sql.ends_with("ILIKE %s)"));

    let term = JsonTerm::from_leaf(&json!(["meta", "json", ["->", "n", "<>", 1]])).unwrap();
    assert!(term.to_sql("t").unwrap().sql.ends_with("!= %s)"));
}

#[test]
fn placeholders_match_parameters() {
    let term = JsonTerm::from_leaf(&json!([
        "meta", "json", ["->", "a", "->", 2, "->", "c", "->>", "d", "like", "x%"]
    ]))
    .unwrap();
    let fragment = term.to_sql("t").unwrap();
    assert_eq!(fragment.sql.matches("%s").count(), fragment.params.len());
    assert_eq!(fragment.params.len(), 5);
}

#[test]
fn rejects_other_domain_operators() {
    assert_eq!(
        JsonTerm::from_leaf(&json!(["meta", "=", "x"])),
        Err(QueryError::NotAJsonTerm)
    );
    assert_eq!(
        JsonTerm::from_leaf(&json!(["", "json", ["->", "a", "=", 1]])),
        Err(QueryError::InvalidField(String::new()))
    );
    assert_eq!(
        JsonTerm::from_leaf(&json!("meta")),
        Err(QueryError::NotAJsonTerm)
    );
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[test]
fn field_that_closes_its_quotes_is_rejected() {
    let field = "data\" IS NOT NULL OR 1=1) --";
    assert_eq!(
        JsonTerm::from_leaf(&json!([field, "json", ["->>", "a", "=", 1]])),
        Err(QueryError::InvalidField(field.to_string()))
    );
    assert_eq!(
        JsonTerm::from_path(field, &["a"], true, None, TermOperator::Eq, json!(1)),
        Err(QueryError::InvalidField(field.to_string()))
    );
}

#[test]
fn alias_that_closes_its_quotes_is_rejected() {
    let term = JsonTerm::from_leaf(&json!(["meta", "json", ["->>", "a", "=", 1]])).unwrap();
    let alias = "t\" ; DROP TABLE x; --";
    assert_eq!(
        term.to_sql(alias),
        Err(QueryError::InvalidAlias(alias.to_string()))
    );
    assert_eq!(term.to_sql(""), Err(QueryError::InvalidAlias(String::new())));
}

#[test]
fn quoted_identifiers_are_not_passed_through() {
    assert!(matches!(
        JsonTerm::from_leaf(&json!(["\"Meta\"", "json", ["->>", "a", "=", 1]])),
        Err(QueryError::InvalidField(_))
    ));
    let term = JsonTerm::from_leaf(&json!(["_meta2", "json", ["->>", "a", "=", 1]])).unwrap();
    let fragment = term.to_sql("res_partner").unwrap();
    assert!(fragment.sql.starts_with("((\"res_partner\".\"_meta2\"->>"));
}

// ---------------------------------------------------------------------------
// Paths from the tree editor
// ---------------------------------------------------------------------------

#[test]
fn path_term_uses_text_for_the_last_step() {
    let term = JsonTerm::from_path(
        "meta",
        &["a", "b"],
        true,
        Some(Cast::Int),
        TermOperator::Gt,
        json!(3),
    )
    .unwrap();
    let fragment = term.to_sql("t").unwrap();
    assert_eq!(fragment.sql, "((\"t\".\"meta\"->%s->>%s)::INT > %s)");
    assert_eq!(fragment.params, vec![json!("a"), json!("b"), json!(3)]);
}

#[test]
fn encoded_row_path_round_trips_into_keys() {
    let keys = ["x.y", "", "z"];
    let encoded = encode_path(&keys);
    let term = JsonTerm::from_encoded_path("meta", &encoded, false, None, TermOperator::Eq, json!(1))
        .unwrap();
    let params = term.to_sql("t").unwrap().params;
    assert_eq!(params, vec![json!("x.y"), json!(""), json!("z"), json!(1)]);
}

#[test]
fn malformed_encoded_path_is_a_path_error() {
    let err = JsonTerm::from_encoded_path("meta", "a/", false, None, TermOperator::Eq, json!(1))
        .unwrap_err();
    assert!(matches!(err, QueryError::Path(_)));
}

#[test]
fn path_words_that_look_like_operators_stay_keys() {
    let term = JsonTerm::from_path("meta", &["->", "in"], false, None, TermOperator::Eq, json!(1))
        .unwrap();
    assert_eq!(term.steps.len(), 2);
    assert_eq!(term.to_sql("t").unwrap().params[..2], [json!("->"), json!("in")]);
}
