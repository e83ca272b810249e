// tests/builder_tests.rs

use jsontemplate::node::{Field, Node};
use jsontemplate::{
    CompileError, Function, FunctionMap, Kind, ParseError, PathError, Signature, Template, Value,
};

fn compile(source: &str) -> Result<Template, CompileError> {
    Template::compile(source, &FunctionMap::builtins())
}

fn root(source: &str) -> Node {
    compile(source)
        .unwrap_or_else(|e| panic!("{}", e))
        .root()
        .clone()
}

#[test]
fn test_literals_become_constants() {
    assert_eq!(root("\"s\""), Node::Constant(Value::from("s")));
    assert_eq!(root("1.5"), Node::Constant(Value::Number(1.5)));
    assert_eq!(root("false"), Node::Constant(Value::Boolean(false)));
    assert_eq!(root("null"), Node::Constant(Value::Null));
}

#[test]
fn test_object_fields_keep_annotations() {
    let Node::Object(fields) = root(r#"{ @since "v": 1, "w": 2 }"#) else {
        panic!("expected an object node");
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields["v"], Field::annotated(Node::Constant(Value::Number(1.0)), "since"));
    assert_eq!(fields["w"], Field::new(Node::Constant(Value::Number(2.0))));
}

#[test]
fn test_duplicate_keys_last_wins() {
    let Node::Object(fields) = root(r#"{"a": 1, "b": 0, "a": 2}"#) else {
        panic!("expected an object node");
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields["a"].value, Node::Constant(Value::Number(2.0)));
}

#[test]
fn test_query_and_generator_nodes() {
    match root("$.a.b") {
        Node::Query(query) => assert_eq!(query.path.as_str(), "$.a.b"),
        other => panic!("expected a query node, got {:?}", other),
    }
    match root("range $.xs[*] [ $.n ]") {
        Node::Generator(generator) => {
            assert_eq!(generator.over.path.as_str(), "$.xs[*]");
            assert!(matches!(*generator.template, Node::Query(_)));
        }
        other => panic!("expected a generator node, got {:?}", other),
    }
}

#[test]
fn test_call_node_resolves_function() {
    match root("trim($.s)") {
        Node::Call(call) => {
            assert_eq!(call.name, "trim");
            assert_eq!(call.args.len(), 1);
            assert_eq!(call.function.signature().params(), &[Kind::String]);
        }
        other => panic!("expected a call node, got {:?}", other),
    }
}

// ============================================================================
// Compile errors
// ============================================================================

#[test]
fn test_parse_errors_are_wrapped() {
    assert!(matches!(
        compile("{\"a\": }"),
        Err(CompileError::Parse(ParseError::Unexpected { .. }))
    ));
}

#[test]
fn test_deep_templates_are_rejected() {
    let deep = format!("{}1{}", "[".repeat(100_000), "]".repeat(100_000));
    assert!(matches!(
        compile(&deep),
        Err(CompileError::Parse(ParseError::TooDeep { limit: 128, .. }))
    ));
}

#[test]
fn test_unknown_function() {
    match compile("{\n  \"x\": nope($.a)\n}") {
        Err(CompileError::UnknownFunction { name, position }) => {
            assert_eq!(name, "nope");
            assert_eq!(position.line, 2);
        }
        other => panic!("expected UnknownFunction, got {:?}", other),
    }
}

#[test]
fn test_unknown_function_inside_generator() {
    assert!(matches!(
        compile("range $[*] [ nope() ]"),
        Err(CompileError::UnknownFunction { .. })
    ));
}

#[test]
fn test_value_binding_is_not_callable() {
    let mut functions = FunctionMap::new();
    functions.define("pi", Value::Number(2.5));
    assert!(matches!(
        Template::compile("pi()", &functions),
        Err(CompileError::NotCallable { name, .. }) if name == "pi"
    ));
}

#[test]
fn test_arity_is_checked_at_compile_time() {
    match compile("trim(\"a\", \"b\")") {
        Err(CompileError::Arity {
            function,
            expected,
            found,
            ..
        }) => {
            assert_eq!(function, "trim");
            assert_eq!(expected, "1");
            assert_eq!(found, 2);
        }
        other => panic!("expected an arity error, got {:?}", other),
    }
    assert!(matches!(compile("coalesce()"), Ok(_)));
    assert!(matches!(compile("join($.a)"), Err(CompileError::Arity { .. })));
}

#[test]
fn test_malformed_signature_is_rejected() {
    let mut functions = FunctionMap::new();
    functions.register(
        "odd",
        Function::new(Signature::new([Kind::optional(Kind::Any)]), |_| Ok(Value::Null)),
    );
    assert!(matches!(
        Template::compile("odd(1)", &functions),
        Err(CompileError::InvalidSignature { .. })
    ));
}

#[test]
fn test_invalid_query_is_a_compile_error() {
    match compile("[1, $.a[?(@.b)]]") {
        Err(CompileError::Query { query, source, .. }) => {
            assert_eq!(query, "$.a[?(@.b)]");
            assert!(matches!(source, PathError::Syntax { .. }));
        }
        other => panic!("expected a query error, got {:?}", other),
    }
    assert!(matches!(
        compile("range $.a[::0] [ 1 ]"),
        Err(CompileError::Query { .. })
    ));
}

#[test]
fn test_plain_json_is_a_template() {
    let template = compile(r#"{"a": [1, "two", {"three": null}]}"#).unwrap();
    assert!(matches!(template.root(), Node::Object(_)));
}
