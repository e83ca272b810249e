//! Host functions callable from templates.
//!
//! Every function is registered together with a [`Signature`] describing the
//! [`Kind`] of each parameter, an optional variadic tail and the kind of the
//! returned value. The builder checks call sites against the signature once,
//! at compile time; at render time each argument is coerced to its declared
//! kind before the host closure runs, so host code can rely on the shape of
//! what it receives.
//!
//! ```
//! use jsontemplate::{Function, FunctionMap, Kind, Signature, Template, Value};
//!
//! let mut functions = FunctionMap::new();
//! functions.register(
//!     "shout",
//!     Function::new(Signature::new([Kind::String]).returns(Kind::String), |args| {
//!         let text = args[0].as_str().unwrap_or_default();
//!         Ok(Value::String(format!("{}!", text.to_uppercase())))
//!     }),
//! );
//!
//! let template = Template::compile(r#"shout("hi")"#, &functions).unwrap();
//! assert_eq!(template.render(&Value::Null).unwrap(), Value::String("HI!".into()));
//! ```

use std::{collections::HashMap, fmt, sync::Arc};

use thiserror::Error;
use tracing::trace;

use crate::{
    evaluator::EvalError,
    output::to_json,
    value::{Map, Value},
};

/// Declared type of a parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Any value, including null
    Any,
    Bool,
    Number,
    String,
    /// Array; null is passed as an empty array
    Array,
    /// Object; null is passed as an empty object
    Object,
    /// The inner kind or null
    Optional(Box<Kind>),
}

impl Kind {
    pub fn optional(inner: Kind) -> Kind {
        Kind::Optional(Box::new(inner))
    }

    /// Kinds that can receive a null argument.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            Kind::Any | Kind::Array | Kind::Object | Kind::Optional(_)
        )
    }

    /// Value passed in place of a null argument. `None` for kinds that
    /// cannot receive null.
    pub fn zero(&self) -> Option<Value> {
        match self {
            Kind::Any | Kind::Optional(_) => Some(Value::Null),
            Kind::Array => Some(Value::Array(Vec::new())),
            Kind::Object => Some(Value::Object(Map::new())),
            Kind::Bool | Kind::Number | Kind::String => None,
        }
    }

    /// Whether a value may be passed where this kind is expected. Null is
    /// accepted only by nullable kinds.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Kind::Any, _) => true,
            (kind, Value::Null) => kind.is_nullable(),
            (Kind::Optional(inner), value) => inner.accepts(value),
            (Kind::Bool, Value::Boolean(_))
            | (Kind::Number, Value::Number(_))
            | (Kind::String, Value::String(_))
            | (Kind::Array, Value::Array(_))
            | (Kind::Object, Value::Object(_)) => true,
            _ => false,
        }
    }

    fn is_well_formed(&self) -> bool {
        match self {
            Kind::Optional(inner) => !matches!(**inner, Kind::Optional(_) | Kind::Any),
            _ => true,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Any => write!(f, "any"),
            Kind::Bool => write!(f, "boolean"),
            Kind::Number => write!(f, "number"),
            Kind::String => write!(f, "string"),
            Kind::Array => write!(f, "array"),
            Kind::Object => write!(f, "object"),
            Kind::Optional(inner) => write!(f, "optional {}", inner),
        }
    }
}

/// Parameter and return kinds of a host function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Kind>,
    variadic: Option<Kind>,
    returns: Kind,
}

impl Signature {
    /// Fixed parameters, returning [`Kind::Any`] unless changed with
    /// [`Signature::returns`].
    pub fn new(params: impl IntoIterator<Item = Kind>) -> Self {
        Signature {
            params: params.into_iter().collect(),
            variadic: None,
            returns: Kind::Any,
        }
    }

    /// Accept any number of trailing arguments of `kind`.
    pub fn variadic(mut self, kind: Kind) -> Self {
        self.variadic = Some(kind);
        self
    }

    pub fn returns(mut self, kind: Kind) -> Self {
        self.returns = kind;
        self
    }

    pub fn params(&self) -> &[Kind] {
        &self.params
    }

    pub fn variadic_kind(&self) -> Option<&Kind> {
        self.variadic.as_ref()
    }

    pub fn return_kind(&self) -> &Kind {
        &self.returns
    }

    /// Whether every kind in the signature is one a call can satisfy.
    pub fn is_well_formed(&self) -> bool {
        self.params
            .iter()
            .chain(self.variadic.iter())
            .chain(std::iter::once(&self.returns))
            .all(Kind::is_well_formed)
    }

    /// Whether a call with `count` arguments fits this signature.
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.variadic.is_some() {
            count >= self.params.len()
        } else {
            count == self.params.len()
        }
    }

    /// Human-readable description of the accepted argument count.
    pub fn arity(&self) -> String {
        if self.variadic.is_some() {
            format!("at least {}", self.params.len())
        } else {
            self.params.len().to_string()
        }
    }

    /// Kind expected at zero-based argument `index`.
    pub fn expected(&self, index: usize) -> Option<&Kind> {
        self.params.get(index).or(self.variadic.as_ref())
    }

    /// Converts an evaluated argument into what the host function receives
    /// at zero-based `index`.
    pub fn coerce(&self, function: &str, index: usize, value: Value) -> Result<Value, EvalError> {
        let position = index + 1;
        let Some(expected) = self.expected(index) else {
            return Err(EvalError::Function {
                function: function.to_string(),
                message: format!("unexpected argument {}", position),
            });
        };

        if value.is_null() {
            return expected.zero().ok_or_else(|| EvalError::NilArgument {
                function: function.to_string(),
                position,
                expected: expected.clone(),
            });
        }

        // An optional parameter takes the bare value; the host sees it as
        // present.
        if expected.accepts(&value) {
            return Ok(value);
        }

        Err(EvalError::ArgumentTypeMismatch {
            function: function.to_string(),
            position,
            actual: value.type_name(),
            expected: expected.clone(),
            value: to_json(&value),
        })
    }
}

/// Failure reported by a host function.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct FunctionError(pub String);

impl FunctionError {
    pub fn new(message: impl Into<String>) -> Self {
        FunctionError(message.into())
    }
}

type NativeFn = dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync;

/// A host function together with its signature.
#[derive(Clone)]
pub struct Function {
    signature: Signature,
    call: Arc<NativeFn>,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Two handles are equal when they share the same host closure.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.call, &other.call) && self.signature == other.signature
    }
}

impl Function {
    pub fn new<F>(signature: Signature, call: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        Function {
            signature,
            call: Arc::new(call),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Calls the host function with already coerced arguments and checks the
    /// result against the declared return kind.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        trace!(function = name, args = args.len(), "calling host function");
        let result = (self.call)(args).map_err(|e| EvalError::Function {
            function: name.to_string(),
            message: e.0,
        })?;

        if !self.signature.returns.accepts(&result) {
            return Err(EvalError::ReturnTypeMismatch {
                function: name.to_string(),
                actual: result.type_name(),
                expected: self.signature.returns.clone(),
            });
        }
        Ok(result)
    }
}

/// What a name in a [`FunctionMap`] refers to.
#[derive(Debug, Clone)]
pub enum Binding {
    Function(Function),
    /// A plain value; naming it in a call is a compile error
    Value(Value),
}

/// Named functions that templates may call.
#[derive(Debug, Clone, Default)]
pub struct FunctionMap {
    bindings: HashMap<String, Binding>,
}

impl FunctionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding the standard functions from [`crate::builtins`].
    pub fn builtins() -> Self {
        let mut map = Self::new();
        crate::builtins::register_all(&mut map);
        map
    }

    pub fn register(&mut self, name: impl Into<String>, function: Function) -> &mut Self {
        self.bindings.insert(name.into(), Binding::Function(function));
        self
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.bindings.insert(name.into(), Binding::Value(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
