use thiserror::Error;
use tracing::trace;

use crate::{
    function::Kind,
    node::{Call, Generator, Node, Query},
    path::PathError,
    value::{Map, Value},
};

/// How queries treat keys that are absent from the input data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    /// Queries referencing missing values evaluate to null.
    #[default]
    NullOnMissing,
    /// Queries referencing missing values fail the render.
    ErrorOnMissing,
}

impl MissingKeyPolicy {
    pub fn tolerates_missing(self) -> bool {
        self == MissingKeyPolicy::NullOnMissing
    }
}

/// Errors that can occur while rendering a template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A query referenced data that is not there (only under
    /// [`MissingKeyPolicy::ErrorOnMissing`])
    #[error("query '{query}' failed: {reason}")]
    MissingKey { query: String, reason: String },

    #[error(
        "cannot pass {value} ({actual}) as argument {position} of {function}, expecting {expected}"
    )]
    ArgumentTypeMismatch {
        function: String,
        position: usize,
        actual: &'static str,
        expected: Kind,
        value: String,
    },

    #[error("cannot pass null as argument {position} of {function}, expecting {expected}")]
    NilArgument {
        function: String,
        position: usize,
        expected: Kind,
    },

    #[error("error executing query '{query}': {source}")]
    QueryResolve { query: String, source: PathError },

    /// The host function itself reported a failure
    #[error("{function}: {message}")]
    Function { function: String, message: String },

    #[error("{function} returned {actual}, expecting {expected}")]
    ReturnTypeMismatch {
        function: String,
        actual: &'static str,
        expected: Kind,
    },
}

impl Node {
    /// Evaluates this node against `input`.
    ///
    /// Evaluation has no side effects: the result depends only on the node,
    /// `input` and `policy`, and a failure anywhere below aborts the whole
    /// node.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsontemplate::{FunctionMap, MissingKeyPolicy, Template, Value};
    ///
    /// let template = Template::compile("[1, $.x]", &FunctionMap::new()).unwrap();
    /// let result = template
    ///     .root()
    ///     .evaluate(&Value::Null, MissingKeyPolicy::NullOnMissing)
    ///     .unwrap();
    /// assert_eq!(result, Value::Array(vec![Value::Number(1.0), Value::Null]));
    /// ```
    pub fn evaluate(&self, input: &Value, policy: MissingKeyPolicy) -> Result<Value, EvalError> {
        match self {
            Node::Constant(value) => Ok(value.clone()),
            Node::Object(fields) => {
                let mut map = Map::with_capacity(fields.len());
                for (key, field) in fields {
                    let value = field.value.evaluate(input, policy)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::Object(map))
            }
            Node::Array(items) => {
                let mut arr = Vec::with_capacity(items.len());
                for item in items {
                    arr.push(item.evaluate(input, policy)?);
                }
                Ok(Value::Array(arr))
            }
            Node::Query(query) => query.evaluate(input, policy),
            Node::Generator(generator) => generator.evaluate(input, policy),
            Node::Call(call) => call.evaluate(input, policy),
        }
    }
}

impl Query {
    /// Matches of this query, or `None` when the input is absent and the
    /// policy allows that.
    fn matches<'a>(
        &self,
        input: &'a Value,
        policy: MissingKeyPolicy,
        action: &str,
    ) -> Result<Option<Vec<&'a Value>>, EvalError> {
        if input.is_null() {
            return match policy {
                MissingKeyPolicy::NullOnMissing => Ok(None),
                MissingKeyPolicy::ErrorOnMissing => Err(EvalError::MissingKey {
                    query: self.path.to_string(),
                    reason: format!("cannot {}, input is null", action),
                }),
            };
        }

        trace!(query = %self.path, "resolving query");
        self.path
            .resolve(input, policy.tolerates_missing())
            .map(Some)
            .map_err(|e| {
                if e.is_missing() {
                    EvalError::MissingKey {
                        query: self.path.to_string(),
                        reason: e.to_string(),
                    }
                } else {
                    EvalError::QueryResolve {
                        query: self.path.to_string(),
                        source: e,
                    }
                }
            })
    }

    /// Zero matches give null, one match gives that value, several give an
    /// array.
    pub fn evaluate(&self, input: &Value, policy: MissingKeyPolicy) -> Result<Value, EvalError> {
        let Some(hits) = self.matches(input, policy, "execute query")? else {
            return Ok(Value::Null);
        };
        Ok(match hits.as_slice() {
            [] => Value::Null,
            [single] => (*single).clone(),
            many => Value::Array(many.iter().map(|v| (*v).clone()).collect()),
        })
    }
}

impl Generator {
    /// Always an array, one element per match, even for zero or one match.
    pub fn evaluate(&self, input: &Value, policy: MissingKeyPolicy) -> Result<Value, EvalError> {
        let Some(hits) = self.over.matches(input, policy, "generate array")? else {
            return Ok(Value::Null);
        };
        let mut arr = Vec::with_capacity(hits.len());
        for hit in hits {
            arr.push(self.template.evaluate(hit, policy)?);
        }
        Ok(Value::Array(arr))
    }
}

impl Call {
    pub fn evaluate(&self, input: &Value, policy: MissingKeyPolicy) -> Result<Value, EvalError> {
        let signature = self.function.signature();
        let mut args = Vec::with_capacity(self.args.len());
        for (index, arg) in self.args.iter().enumerate() {
            let value = arg.evaluate(input, policy)?;
            args.push(signature.coerce(&self.name, index, value)?);
        }
        self.function.invoke(&self.name, &args)
    }
}
