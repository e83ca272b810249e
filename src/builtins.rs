//! Standard functions, available through [`FunctionMap::builtins`].
//!
//! | function              | result                                           |
//! |-----------------------|--------------------------------------------------|
//! | `to_upper(s)`         | `s` in upper case                                |
//! | `to_lower(s)`         | `s` in lower case                                |
//! | `trim(s)`             | `s` without leading and trailing whitespace      |
//! | `length(v)`           | characters of a string, items of an array/object |
//! | `coalesce(v, ...)`    | first argument that is not null                  |
//! | `default(v, d)`       | `v`, or `d` when `v` is null                     |
//! | `sum(a)`              | sum of the numbers in `a`                        |
//! | `avg(a)`              | mean of the numbers in `a`, null if there are none |
//! | `join(a, sep)`        | items of `a` joined with `sep`                   |
//! | `matches(s, re)`      | whether regex `re` matches `s`                   |
//! | `replace(s, re, r)`   | `s` with every match of `re` replaced by `r`     |
//! | `keys(o)`             | member names of `o`                              |
//!
//! `sum` and `avg` accumulate in decimal so that `0.1 + 0.2` is `0.3`.

use regex::Regex;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    function::{Function, FunctionError, FunctionMap, Kind, Signature},
    output::to_json,
    value::Value,
};

pub fn register_all(map: &mut FunctionMap) {
    map.register("to_upper", string_fn(|s| s.to_uppercase()))
        .register("to_lower", string_fn(|s| s.to_lowercase()))
        .register("trim", string_fn(|s| s.trim().to_string()))
        .register(
            "length",
            Function::new(Signature::new([Kind::Any]).returns(Kind::Number), length),
        )
        .register(
            "coalesce",
            Function::new(Signature::new(Vec::<Kind>::new()).variadic(Kind::Any), |args| {
                Ok(args.iter().find(|v| !v.is_null()).cloned().unwrap_or_default())
            }),
        )
        .register(
            "default",
            Function::new(Signature::new([Kind::Any, Kind::Any]), |args| {
                Ok(match args {
                    [Value::Null, fallback] => fallback.clone(),
                    [value, _] => value.clone(),
                    _ => Value::Null,
                })
            }),
        )
        .register(
            "sum",
            Function::new(Signature::new([Kind::Array]).returns(Kind::Number), |args| {
                let nums = numbers(array_arg(args, 0)?);
                Ok(Value::Number(decimal_sum(&nums)))
            }),
        )
        .register(
            "avg",
            Function::new(
                Signature::new([Kind::Array]).returns(Kind::optional(Kind::Number)),
                |args| {
                    let nums = numbers(array_arg(args, 0)?);
                    Ok(decimal_avg(&nums).map_or(Value::Null, Value::Number))
                },
            ),
        )
        .register(
            "join",
            Function::new(
                Signature::new([Kind::Array, Kind::String]).returns(Kind::String),
                |args| {
                    let sep = string_arg(args, 1)?;
                    let parts: Vec<String> = array_arg(args, 0)?
                        .iter()
                        .map(|v| match v {
                            Value::String(s) => s.clone(),
                            other => to_json(other),
                        })
                        .collect();
                    Ok(Value::String(parts.join(sep)))
                },
            ),
        )
        .register(
            "matches",
            Function::new(
                Signature::new([Kind::String, Kind::String]).returns(Kind::Bool),
                |args| {
                    let re = regex(string_arg(args, 1)?)?;
                    Ok(Value::Boolean(re.is_match(string_arg(args, 0)?)))
                },
            ),
        )
        .register(
            "replace",
            Function::new(
                Signature::new([Kind::String, Kind::String, Kind::String]).returns(Kind::String),
                |args| {
                    let re = regex(string_arg(args, 1)?)?;
                    let replaced = re.replace_all(string_arg(args, 0)?, string_arg(args, 2)?);
                    Ok(Value::String(replaced.into_owned()))
                },
            ),
        )
        .register(
            "keys",
            Function::new(Signature::new([Kind::Object]).returns(Kind::Array), |args| {
                let obj = args
                    .first()
                    .and_then(Value::as_object)
                    .ok_or_else(|| FunctionError::new("expected an object"))?;
                Ok(Value::Array(
                    obj.keys().map(|k| Value::String(k.clone())).collect(),
                ))
            }),
        );
}

/// A one-string-in, one-string-out function.
fn string_fn(f: fn(&str) -> String) -> Function {
    Function::new(
        Signature::new([Kind::String]).returns(Kind::String),
        move |args| Ok(Value::String(f(string_arg(args, 0)?))),
    )
}

fn string_arg(args: &[Value], index: usize) -> Result<&str, FunctionError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| FunctionError::new(format!("argument {} must be a string", index + 1)))
}

fn array_arg(args: &[Value], index: usize) -> Result<&[Value], FunctionError> {
    args.get(index)
        .and_then(Value::as_array)
        .ok_or_else(|| FunctionError::new(format!("argument {} must be an array", index + 1)))
}

fn regex(pattern: &str) -> Result<Regex, FunctionError> {
    Regex::new(pattern).map_err(|e| FunctionError::new(format!("invalid regex: {e}")))
}

fn length(args: &[Value]) -> Result<Value, FunctionError> {
    let len = match args.first() {
        None | Some(Value::Null) => 0,
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Array(arr)) => arr.len(),
        Some(Value::Object(obj)) => obj.len(),
        Some(other) => {
            return Err(FunctionError::new(format!(
                "length of {} is undefined",
                other.type_name()
            )));
        }
    };
    Ok(Value::Number(len as f64))
}

/// The numeric items of an array; everything else is skipped.
fn numbers(items: &[Value]) -> Vec<f64> {
    items.iter().filter_map(Value::as_f64).collect()
}

fn to_decimals(nums: &[f64]) -> Option<Vec<Decimal>> {
    nums.iter().map(|n| Decimal::from_f64(*n)).collect()
}

fn decimal_sum(nums: &[f64]) -> f64 {
    to_decimals(nums)
        .and_then(|ds| ds.into_iter().try_fold(Decimal::ZERO, |acc, d| acc.checked_add(d)))
        .and_then(|total| total.to_f64())
        // Out of decimal range; fall back to plain floats.
        .unwrap_or_else(|| nums.iter().sum())
}

fn decimal_avg(nums: &[f64]) -> Option<f64> {
    if nums.is_empty() {
        return None;
    }
    let precise = to_decimals(nums)
        .and_then(|ds| ds.into_iter().try_fold(Decimal::ZERO, |acc, d| acc.checked_add(d)))
        .and_then(|total| total.checked_div(Decimal::from(nums.len())))
        .and_then(|mean| mean.to_f64());
    Some(precise.unwrap_or_else(|| nums.iter().sum::<f64>() / nums.len() as f64))
}
