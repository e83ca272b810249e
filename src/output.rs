//! JSON output serialization for rendered values.
//!
//! This module provides JSON serialization with support for both compact and
//! pretty-printed output formats. All output is deterministic (object keys are
//! sorted) and follows standard JSON formatting rules.
//!
//! # Features
//!
//! - **Compact output** via [`to_json()`] - minimal whitespace for efficient transmission
//! - **Pretty output** via [`to_json_pretty()`] - human-readable with 2-space indentation
//! - **String escaping** - handles special characters, control codes, and Unicode
//! - **Deterministic** - object keys are always sorted alphabetically
//!
//! # Examples
//!
//! ```
//! use jsontemplate::Value;
//! use jsontemplate::output::{to_json, to_json_pretty};
//!
//! let value = Value::Number(42.0);
//!
//! // Compact output
//! assert_eq!(to_json(&value), "42");
//!
//! // Pretty output (identical for simple values)
//! assert_eq!(to_json_pretty(&value), "42");
//! ```

use crate::value::{Map, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            // JSON has no NaN or infinity
            Value::Number(n) if !n.is_finite() => "null".to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => format!("\"{}\"", self.escape_string(s)),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(obj) => self.print_object(obj, indent),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        if self.pretty {
            let mut result = "[\n".to_string();
            let items: Vec<String> = arr
                .iter()
                .map(|v| {
                    format!(
                        "{}{}",
                        self.indent(indent + 1),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push(']');
            result
        } else {
            let items: Vec<String> = arr.iter().map(|v| self.print_value(v, indent)).collect();
            format!("[{}]", items.join(","))
        }
    }

    fn print_object(&self, obj: &Map, indent: usize) -> String {
        if obj.is_empty() {
            return "{}".to_string();
        }

        // Sort keys for deterministic output
        let mut entries: Vec<_> = obj.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        if self.pretty {
            let mut result = "{\n".to_string();
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}\"{}\": {}",
                        self.indent(indent + 1),
                        self.escape_string(k),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push('}');
            result
        } else {
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| {
                    format!(
                        "\"{}\":{}",
                        self.escape_string(k),
                        self.print_value(v, indent)
                    )
                })
                .collect();
            format!("{{{}}}", items.join(","))
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn escape_string(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                // Unicode escape for control chars
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out
    }
}

// Convenience functions

/// Converts a Value to compact JSON string representation.
///
/// # Examples
///
/// ```
/// use jsontemplate::Value;
/// use jsontemplate::output::to_json;
/// use jsontemplate::value::Map;
///
/// let mut obj = Map::new();
/// obj.insert("name".to_string(), Value::String("Alice".to_string()));
/// obj.insert("age".to_string(), Value::Number(30.0));
///
/// assert_eq!(to_json(&Value::Object(obj)), r#"{"age":30,"name":"Alice"}"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to pretty-printed JSON string representation.
///
/// Two-space indentation, one element or property per line.
///
/// # Examples
///
/// ```
/// use jsontemplate::Value;
/// use jsontemplate::output::to_json_pretty;
/// use jsontemplate::value::Map;
///
/// let mut obj = Map::new();
/// obj.insert("name".to_string(), Value::String("Alice".to_string()));
/// obj.insert("age".to_string(), Value::Number(30.0));
///
/// assert_eq!(to_json_pretty(&Value::Object(obj)), "{\n  \"age\": 30,\n  \"name\": \"Alice\"\n}");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
