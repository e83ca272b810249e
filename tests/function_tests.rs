// tests/function_tests.rs

use jsontemplate::convert::json_to_value;
use jsontemplate::{
    Binding, EvalError, Function, FunctionError, FunctionMap, Kind, Signature, Template, Value,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn render(functions: &FunctionMap, source: &str, input: serde_json::Value) -> Result<Value, EvalError> {
    Template::compile(source, functions)
        .unwrap_or_else(|e| panic!("{}", e))
        .render(&json_to_value(input))
}

fn builtin(source: &str, input: serde_json::Value) -> Value {
    render(&FunctionMap::builtins(), source, input).unwrap_or_else(|e| panic!("{}", e))
}

/// Echoes its arguments back as an array.
fn echo(params: Vec<Kind>) -> Function {
    Function::new(Signature::new(params).returns(Kind::Array), |args| {
        Ok(Value::Array(args.to_vec()))
    })
}

// ============================================================================
// Kinds and signatures
// ============================================================================

#[test]
fn test_kind_display() {
    assert_eq!(Kind::Number.to_string(), "number");
    assert_eq!(Kind::optional(Kind::String).to_string(), "optional string");
    assert_eq!(Kind::Bool.to_string(), "boolean");
}

#[test]
fn test_kind_zero_values() {
    assert_eq!(Kind::Array.zero(), Some(Value::Array(vec![])));
    assert_eq!(Kind::Any.zero(), Some(Value::Null));
    assert_eq!(Kind::optional(Kind::Number).zero(), Some(Value::Null));
    assert_eq!(Kind::Number.zero(), None);
    assert_eq!(Kind::String.zero(), None);
    assert_eq!(Kind::Bool.zero(), None);
    assert!(matches!(Kind::Object.zero(), Some(Value::Object(m)) if m.is_empty()));
}

#[test]
fn test_arity_description() {
    assert_eq!(Signature::new([Kind::Any, Kind::Any]).arity(), "2");
    assert_eq!(Signature::new([Kind::Any]).variadic(Kind::Number).arity(), "at least 1");
}

#[test]
fn test_signature_parts() {
    let plain = Signature::new([Kind::String]);
    assert_eq!(plain.variadic_kind(), None);
    assert_eq!(plain.return_kind(), &Kind::Any);

    let rich = Signature::new([Kind::String])
        .variadic(Kind::Number)
        .returns(Kind::Array);
    assert_eq!(rich.params(), &[Kind::String]);
    assert_eq!(rich.variadic_kind(), Some(&Kind::Number));
    assert_eq!(rich.return_kind(), &Kind::Array);
}

// ============================================================================
// Argument coercion
// ============================================================================

#[test]
fn test_null_to_nullable_parameters() {
    let mut functions = FunctionMap::new();
    functions.register(
        "f",
        echo(vec![Kind::Array, Kind::Object, Kind::Any, Kind::optional(Kind::Number)]),
    );

    let result = render(&functions, "f($.a, $.b, $.c, $.d)", json!({})).unwrap();
    assert_eq!(
        result,
        json_to_value(json!([[], {}, null, null]))
    );
}

#[test]
fn test_null_to_non_nullable_parameter() {
    let mut functions = FunctionMap::new();
    functions.register("f", echo(vec![Kind::Number, Kind::String]));

    let err = render(&functions, "f(1, $.missing)", json!({})).unwrap_err();
    assert_eq!(
        err,
        EvalError::NilArgument {
            function: "f".into(),
            position: 2,
            expected: Kind::String,
        }
    );
}

#[test]
fn test_value_to_optional_parameter() {
    let mut functions = FunctionMap::new();
    functions.register("f", echo(vec![Kind::optional(Kind::Number)]));

    let result = render(&functions, "f($.n)", json!({"n": 4})).unwrap();
    assert_eq!(result, Value::Array(vec![Value::Number(4.0)]));
}

#[test]
fn test_argument_type_mismatch() {
    let mut functions = FunctionMap::new();
    functions.register("f", echo(vec![Kind::Number]));

    match render(&functions, "f($.s)", json!({"s": "seven"})) {
        Err(EvalError::ArgumentTypeMismatch {
            function,
            position,
            actual,
            expected,
            value,
        }) => {
            assert_eq!(function, "f");
            assert_eq!(position, 1);
            assert_eq!(actual, "string");
            assert_eq!(expected, Kind::Number);
            assert_eq!(value, "\"seven\"");
        }
        other => panic!("expected a type mismatch, got {:?}", other),
    }
}

#[test]
fn test_variadic_arguments() {
    let mut functions = FunctionMap::new();
    functions.register(
        "f",
        Function::new(Signature::new([Kind::String]).variadic(Kind::Number), |args| {
            Ok(Value::Number(args.len() as f64))
        }),
    );

    assert_eq!(render(&functions, r#"f("a")"#, json!(null)), Ok(Value::Number(1.0)));
    assert_eq!(render(&functions, r#"f("a", 1, 2, 3)"#, json!(null)), Ok(Value::Number(4.0)));
    assert!(matches!(
        render(&functions, r#"f("a", 1, "x")"#, json!(null)),
        Err(EvalError::ArgumentTypeMismatch { position: 3, .. })
    ));
}

// ============================================================================
// Invocation
// ============================================================================

#[test]
fn test_host_error_is_reported() {
    let mut functions = FunctionMap::new();
    functions.register(
        "fail",
        Function::new(Signature::new(Vec::<Kind>::new()), |_| {
            Err(FunctionError::new("out of coffee"))
        }),
    );

    let err = render(&functions, "fail()", json!(null)).unwrap_err();
    assert_eq!(
        err,
        EvalError::Function {
            function: "fail".into(),
            message: "out of coffee".into(),
        }
    );
    assert_eq!(err.to_string(), "fail: out of coffee");
}

#[test]
fn test_return_kind_is_checked() {
    let mut functions = FunctionMap::new();
    functions.register(
        "liar",
        Function::new(Signature::new(Vec::<Kind>::new()).returns(Kind::Number), |_| {
            Ok(Value::from("not a number"))
        }),
    );

    assert!(matches!(
        render(&functions, "liar()", json!(null)),
        Err(EvalError::ReturnTypeMismatch { actual: "string", .. })
    ));
}

#[test]
fn test_calls_in_nested_positions() {
    let mut functions = FunctionMap::new();
    functions.register(
        "double",
        Function::new(Signature::new([Kind::Number]).returns(Kind::Number), |args| {
            Ok(Value::Number(args[0].as_f64().unwrap_or_default() * 2.0))
        }),
    );

    let result = render(
        &functions,
        r#"{ "xs": range $.items[*] [ double($.n) ], "nested": double(double($.k)) }"#,
        json!({"items": [{"n": 1}, {"n": 2}], "k": 5}),
    )
    .unwrap();
    assert_eq!(result, json_to_value(json!({"xs": [2, 4], "nested": 20})));
}

// ============================================================================
// Function map
// ============================================================================

#[test]
fn test_function_map_bindings() {
    let mut functions = FunctionMap::new();
    assert!(functions.is_empty());
    functions
        .register("f", echo(vec![]))
        .define("answer", Value::Number(42.0));

    assert_eq!(functions.len(), 2);
    assert!(functions.contains("f"));
    assert!(matches!(functions.get("f"), Some(Binding::Function(_))));
    assert!(matches!(functions.get("answer"), Some(Binding::Value(_))));
    assert!(functions.get("g").is_none());
}

#[test]
fn test_registering_again_replaces() {
    let mut functions = FunctionMap::new();
    functions.register("f", echo(vec![Kind::Any]));
    functions.register("f", echo(vec![]));
    assert_eq!(render(&functions, "f()", json!(null)), Ok(Value::Array(vec![])));
}

// ============================================================================
// Standard functions
// ============================================================================

#[test]
fn test_string_builtins() {
    let input = json!({"name": "  Ana María  "});
    assert_eq!(builtin("to_upper($.name)", input.clone()), Value::from("  ANA MARÍA  "));
    assert_eq!(builtin("to_lower($.name)", input.clone()), Value::from("  ana maría  "));
    assert_eq!(builtin("trim($.name)", input.clone()), Value::from("Ana María"));
    assert_eq!(builtin("length(trim($.name))", input), Value::Number(9.0));
}

#[test]
fn test_length_of_collections() {
    let input = json!({"xs": [1, 2, 3], "o": {"a": 1}});
    assert_eq!(builtin("length($.xs)", input.clone()), Value::Number(3.0));
    assert_eq!(builtin("length($.o)", input.clone()), Value::Number(1.0));
    assert_eq!(builtin("length($.missing)", input), Value::Number(0.0));
}

#[test]
fn test_coalesce_and_default() {
    let input = json!({"b": "second", "c": "third"});
    assert_eq!(builtin("coalesce($.a, $.b, $.c)", input.clone()), Value::from("second"));
    assert_eq!(builtin("coalesce($.a)", input.clone()), Value::Null);
    assert_eq!(builtin(r#"default($.a, "fallback")"#, input.clone()), Value::from("fallback"));
    assert_eq!(builtin(r#"default($.b, "fallback")"#, input), Value::from("second"));
}

#[test]
fn test_sum_and_avg() {
    let input = json!({"prices": [0.1, 0.2, "n/a", 0.3]});
    assert_eq!(builtin("sum($.prices)", input.clone()), Value::Number(0.6));
    assert_eq!(builtin("avg($.prices)", input), Value::Number(0.2));
    assert_eq!(builtin("avg($.none)", json!({})), Value::Null);
    assert_eq!(builtin("sum($.none)", json!({})), Value::Number(0.0));
}

#[test]
fn test_join() {
    let input = json!({"tags": ["a", 1, true]});
    assert_eq!(builtin(r#"join($.tags, "-")"#, input), Value::from("a-1-true"));
}

#[test]
fn test_regex_builtins() {
    let input = json!({"id": "ab-123"});
    assert_eq!(builtin(r#"matches($.id, "^[a-z]+-\\d+$")"#, input.clone()).as_bool(), Some(true));
    assert_eq!(builtin(r#"matches($.id, "^\\d")"#, input.clone()).as_bool(), Some(false));
    assert_eq!(builtin(r##"replace($.id, "\\d", "#")"##, input), Value::from("ab-###"));
}

#[test]
fn test_invalid_regex_is_a_function_error() {
    let err = render(&FunctionMap::builtins(), r#"matches("x", "(")"#, json!(null)).unwrap_err();
    assert!(matches!(err, EvalError::Function { function, .. } if function == "matches"));
}

#[test]
fn test_keys() {
    assert_eq!(
        builtin("keys($)", json!({"z": 1, "a": 2})),
        json_to_value(json!(["z", "a"]))
    );
}
