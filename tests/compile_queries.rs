//! End-to-end compilation: query text in, WHERE fragment and parameters out.

use std::sync::Arc;

use docql::{CompileError, QueryCompiler, SchemaDescriptor, SchemaRegistry};
use test_case::test_case;

fn compiler(primary: &str) -> QueryCompiler {
    let _ = env_logger::builder().is_test(true).try_init();
    let descriptor = SchemaDescriptor::from_json_str(
        r#"{
            "tables": {
                "tablea": {},
                "tableb": {"foreignKeys": [{"field": "tableaId", "targetTable": "tablea"}]},
                "tablec": {"foreignKeys": [{"field": "tablebId", "targetTable": "tableb"}]}
            }
        }"#,
    )
    .unwrap();
    let registry = Arc::new(SchemaRegistry::load(&descriptor).unwrap());
    QueryCompiler::new(registry, primary).unwrap()
}

#[test_case("name == test1", "tablea.jsonb->>'name' = $1", "test1"; "exact")]
#[test_case("name <> test1", "tablea.jsonb->>'name' <> $1", "test1"; "not equal")]
#[test_case("name = Test", "lower(tablea.jsonb->>'name') LIKE lower($1)", "%Test%"; "substring")]
#[test_case("name >= alpha", "tablea.jsonb->>'name' >= $1", "alpha"; "relational text")]
fn single_comparison(query: &str, clause: &str, parameter: &str) {
    let q = compiler("tablea").to_sql(query).unwrap();
    assert_eq!(q.where_clause, clause);
    assert_eq!(q.parameters, vec![parameter]);
}

#[test]
fn relational_on_numeric_literal_compares_numerically() {
    let q = compiler("tablea").to_sql("age > 30").unwrap();
    assert_eq!(
        q.where_clause,
        "(tablea.jsonb->>'age')::numeric > ($1)::numeric"
    );
    assert_eq!(q.parameters, vec!["30"]);
}

#[test]
fn boolean_chain_keeps_parameter_order() {
    let q = compiler("tablea")
        .to_sql("a == 1 or b == 2 or c == 3")
        .unwrap();
    assert_eq!(
        q.where_clause,
        "(tablea.jsonb->>'a' = $1 OR tablea.jsonb->>'b' = $2 OR tablea.jsonb->>'c' = $3)"
    );
    assert_eq!(q.parameters, vec!["1", "2", "3"]);
}

#[test]
fn parenthesized_groups_nest() {
    let q = compiler("tablea")
        .to_sql("(a == 1 and b == 2) or not c == 3")
        .unwrap();
    assert_eq!(
        q.where_clause,
        "((tablea.jsonb->>'a' = $1 AND tablea.jsonb->>'b' = $2) OR NOT (tablea.jsonb->>'c' = $3))"
    );
}

#[test]
fn mixed_and_or_without_parentheses_is_a_syntax_error() {
    let err = compiler("tablea")
        .to_sql("a == 1 and b == 2 or c == 3")
        .unwrap_err();
    match err {
        CompileError::Syntax(e) => assert!(e.message.contains("parentheses"), "{}", e.message),
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn bare_star_matches_any_value() {
    let q = compiler("tablea").to_sql("name == *").unwrap();
    assert_eq!(q.where_clause, "tablea.jsonb->>'name' IS NOT NULL");
    assert!(q.parameters.is_empty());
}

#[test]
fn embedded_wildcard_compiles_to_like() {
    let q = compiler("tablea").to_sql("name == te*1").unwrap();
    assert_eq!(q.where_clause, "tablea.jsonb->>'name' LIKE $1");
    assert_eq!(q.parameters, vec!["te%1"]);
}

#[test]
fn quoted_value_with_escapes() {
    let q = compiler("tablea")
        .to_sql(r#"name == "say \"hi\" \* now""#)
        .unwrap();
    assert_eq!(q.where_clause, "tablea.jsonb->>'name' = $1");
    assert_eq!(q.parameters, vec![r#"say "hi" * now"#]);
}

#[test]
fn like_metacharacters_cannot_widen_a_match() {
    // A literal `%` in the value must not act as a wildcard in the pattern.
    let q = compiler("tablea").to_sql(r#"name = "50%""#).unwrap();
    assert_eq!(q.parameters, vec!["%50\\%%"]);
}

#[test_case("x0') )); ((( 'DROP tableb"; "paren smashing")]
#[test_case("x0')  or 1=1)--"; "tautology with comment")]
fn injection_payload_never_reaches_sql_text(payload: &str) {
    let q = compiler("tablea")
        .to_sql(&format!("name == \"{}\"", payload))
        .unwrap();
    assert_eq!(q.where_clause, "tablea.jsonb->>'name' = $1");
    assert_eq!(q.parameters, vec![payload]);
}

#[test]
fn sortby_appends_order_by() {
    let q = compiler("tablea")
        .to_sql("name == * sortby name desc rank")
        .unwrap();
    assert_eq!(
        q.to_string(),
        "WHERE tablea.jsonb->>'name' IS NOT NULL \
         ORDER BY tablea.jsonb->>'name' DESC, tablea.jsonb->>'rank' ASC"
    );
}

#[test]
fn syntax_error_reports_offset() {
    let err = compiler("tablea").to_sql("name == x1 ???").unwrap_err();
    match err {
        CompileError::Syntax(e) => assert_eq!(e.offset, 11),
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn empty_query_is_rejected() {
    assert!(matches!(
        compiler("tablea").to_sql("  ").unwrap_err(),
        CompileError::Syntax(_)
    ));
}

#[test]
fn compilation_is_deterministic() {
    let c = compiler("tablea");
    let query = r#"(a == 1 and tableb.prefix == "x*") or not c <> 3 sortby a desc"#;
    assert_eq!(c.to_sql(query).unwrap(), c.to_sql(query).unwrap());
}
