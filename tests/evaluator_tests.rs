// tests/evaluator_tests.rs

use jsontemplate::convert::json_to_value;
use jsontemplate::node::Node;
use jsontemplate::{EvalError, FunctionMap, MissingKeyPolicy, PathError, Template, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn template(source: &str) -> Template {
    Template::compile(source, &FunctionMap::builtins()).unwrap_or_else(|e| panic!("{}", e))
}

fn render(source: &str, input: serde_json::Value) -> Value {
    template(source)
        .render(&json_to_value(input))
        .unwrap_or_else(|e| panic!("{}", e))
}

fn render_strict(source: &str, input: serde_json::Value) -> Result<Value, EvalError> {
    template(source).render_with(&json_to_value(input), MissingKeyPolicy::ErrorOnMissing)
}

fn expect(value: serde_json::Value) -> Value {
    json_to_value(value)
}

// ============================================================================
// Literals
// ============================================================================

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        (-1.0e9..1.0e9f64).prop_map(Value::Number),
        "[ -~]{0,16}".prop_map(Value::String),
    ]
}

fn any_input() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_constants_ignore_input(value in scalar(), input in any_input()) {
        let node = Node::Constant(value.clone());
        for policy in [MissingKeyPolicy::NullOnMissing, MissingKeyPolicy::ErrorOnMissing] {
            prop_assert_eq!(node.evaluate(&input, policy), Ok(value.clone()));
        }
    }
}

#[test]
fn test_duplicate_key_last_wins() {
    assert_eq!(render(r#"{"a": 1, "a": 2}"#, json!(null)), expect(json!({"a": 2})));
}

#[test]
fn test_array_order() {
    assert_eq!(render("[1, 2, 3]", json!(null)), expect(json!([1, 2, 3])));
}

#[test]
fn test_annotations_are_stripped() {
    assert_eq!(render(r#"{@deprecated "x": 1}"#, json!(null)), expect(json!({"x": 1})));
    assert_eq!(
        render(r#"{@range "x": 1, @null "y": 2}"#, json!(null)),
        expect(json!({"x": 1, "y": 2}))
    );
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_query_collapsing() {
    let input = json!({"one": [7], "many": [1, 2], "none": []});
    assert_eq!(render("$.none[*]", input.clone()), Value::Null);
    assert_eq!(render("$.one[*]", input.clone()), Value::Number(7.0));
    assert_eq!(render("$.many[*]", input), expect(json!([1, 2])));
}

#[test]
fn test_single_match_of_an_array_is_the_array() {
    assert_eq!(render("$.xs", json!({"xs": [1, 2]})), expect(json!([1, 2])));
}

#[test]
fn test_root_query() {
    let input = json!({"a": {"b": true}});
    assert_eq!(render("$", input.clone()), expect(input));
}

#[test]
fn test_field_access() {
    assert_eq!(
        render(r#"{ "CamelCase": $.snakeCase }"#, json!({"snakeCase": 123})),
        expect(json!({"CamelCase": 123}))
    );
}

// ============================================================================
// Generators
// ============================================================================

#[test]
fn test_generator_maps_matches() {
    assert_eq!(
        render(
            r#"range $.items[*] [{"v": $.n}]"#,
            json!({"items": [{"n": 1}, {"n": 2}]})
        ),
        expect(json!([{"v": 1}, {"v": 2}]))
    );
}

#[test]
fn test_generator_never_collapses() {
    assert_eq!(render("range $.xs[*] [ $ ]", json!({"xs": []})), expect(json!([])));
    assert_eq!(render("range $.xs[*] [ $ ]", json!({"xs": [5]})), expect(json!([5])));
    assert_eq!(render("range $.missing[*] [ $ ]", json!({})), expect(json!([])));
}

#[test]
fn test_generator_order_follows_query() {
    assert_eq!(
        render("range $..n [ $ ]", json!({"b": {"n": 2}, "a": [{"n": 1}, {"n": 3}]})),
        expect(json!([2, 1, 3]))
    );
}

#[test]
fn test_nested_generators() {
    let input = json!({"rows": [{"cells": [1, 2]}, {"cells": []}, {"cells": [3]}]});
    assert_eq!(
        render("range $.rows[*] [ range $.cells[*] [ $ ] ]", input),
        expect(json!([[1, 2], [], [3]]))
    );
}

#[test]
fn test_generator_elements_see_only_their_match() {
    let input = json!({"top": "t", "xs": [{"v": 1}]});
    assert_eq!(
        render(r#"range $.xs[*] [ {"v": $.v, "top": $.top} ]"#, input),
        expect(json!([{"v": 1, "top": null}]))
    );
}

// ============================================================================
// Missing keys
// ============================================================================

#[test]
fn test_missing_chain_is_null_by_default() {
    assert_eq!(
        render(r#"{"x": $.a.b.c}"#, json!({"a": {}})),
        expect(json!({"x": null}))
    );
}

#[test]
fn test_missing_chain_fails_when_strict() {
    match render_strict(r#"{"x": $.a.b.c}"#, json!({"a": {}})) {
        Err(EvalError::MissingKey { query, reason }) => {
            assert_eq!(query, "$.a.b.c");
            assert!(reason.contains("'b'"), "{}", reason);
        }
        other => panic!("expected MissingKey, got {:?}", other),
    }
}

#[test]
fn test_out_of_bounds_follows_policy() {
    let input = json!({"xs": [1]});
    assert_eq!(render("$.xs[3]", input.clone()), Value::Null);
    assert!(matches!(
        render_strict("$.xs[3]", input),
        Err(EvalError::MissingKey { .. })
    ));
}

#[test]
fn test_absent_input() {
    assert_eq!(render("$.a", json!(null)), Value::Null);
    assert_eq!(render("range $[*] [ 1 ]", json!(null)), Value::Null);
    assert_eq!(render(r#"{"k": "v"}"#, json!(null)), expect(json!({"k": "v"})));

    match render_strict("range $[*] [ 1 ]", json!(null)) {
        Err(EvalError::MissingKey { reason, .. }) => {
            assert!(reason.contains("cannot generate array"), "{}", reason)
        }
        other => panic!("expected MissingKey, got {:?}", other),
    }
    match render_strict("$.a", json!(null)) {
        Err(EvalError::MissingKey { reason, .. }) => {
            assert!(reason.contains("cannot execute query"), "{}", reason)
        }
        other => panic!("expected MissingKey, got {:?}", other),
    }
}

#[test]
fn test_indexing_a_non_array_is_always_an_error() {
    let input = json!({"o": {"k": 1}});
    for policy in [MissingKeyPolicy::NullOnMissing, MissingKeyPolicy::ErrorOnMissing] {
        let result = template("$.o[0]").render_with(&json_to_value(input.clone()), policy);
        assert_eq!(
            result,
            Err(EvalError::QueryResolve {
                query: "$.o[0]".into(),
                source: PathError::NotAnArray("object"),
            })
        );
    }
}

#[test]
fn test_policy_on_template() {
    let mut t = template("$.gone");
    assert_eq!(t.missing_keys(), MissingKeyPolicy::NullOnMissing);
    t.set_missing_keys(MissingKeyPolicy::ErrorOnMissing);
    assert!(t.render(&expect(json!({}))).is_err());
    // a one-off override leaves the template's policy alone
    assert_eq!(
        t.render_with(&expect(json!({})), MissingKeyPolicy::NullOnMissing),
        Ok(Value::Null)
    );
    assert_eq!(t.missing_keys(), MissingKeyPolicy::ErrorOnMissing);
}

#[test]
fn test_error_aborts_whole_render() {
    let result = render_strict(r#"{"ok": 1, "items": [$.present, $.absent]}"#, json!({"present": 1}));
    assert!(result.is_err());
}

// ============================================================================
// Function calls
// ============================================================================

#[test]
fn test_function_call_in_object() {
    assert_eq!(
        render(r#"{"greeting": to_upper($.name)}"#, json!({"name": "ana"})),
        expect(json!({"greeting": "ANA"}))
    );
}

#[test]
fn test_function_receives_collapsed_query() {
    // `$..n` matches several values and collapses to an array
    assert_eq!(
        render("sum($..n)", json!({"a": {"n": 1}, "b": {"n": 2}})),
        Value::Number(3.0)
    );
}
