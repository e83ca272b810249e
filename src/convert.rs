//! `serde_json::Value` <-> [`Value`] conversion utilities

use crate::value::Value;

/// Convert serde_json::Value to a template Value
///
/// Every number becomes an `f64`.
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => {
            Value::Object(obj.into_iter().map(|(k, v)| (k, json_to_value(v))).collect())
        }
    }
}

/// Convert a template Value to serde_json::Value
///
/// Non-finite numbers have no JSON form and become null.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Number(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        json_to_value(v)
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        value_to_json(v)
    }
}

#[test]
fn test_integers_become_floats() {
    let v = json_to_value(serde_json::json!({"n": 123, "xs": [1, 2.5]}));
    let obj = v.as_object().unwrap();
    assert_eq!(obj["n"], Value::Number(123.0));
    assert_eq!(
        obj["xs"],
        Value::Array(vec![Value::Number(1.0), Value::Number(2.5)])
    );
}

#[test]
fn test_values_back_to_json() {
    let v = Value::Array(vec![
        Value::Number(1.5),
        Value::Number(f64::NAN),
        Value::Number(f64::INFINITY),
        Value::Object([("k".to_string(), Value::Boolean(true))].into_iter().collect()),
    ]);
    assert_eq!(
        serde_json::Value::from(v),
        serde_json::json!([1.5, null, null, {"k": true}])
    );
    assert_eq!(value_to_json(Value::from("s")), serde_json::json!("s"));
}
