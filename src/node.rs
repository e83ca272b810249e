//! The compiled, executable form of a template.
//!
//! Nodes are produced by the [builder](crate::builder) and evaluated by the
//! [evaluator](crate::evaluator). Each node owns its children, so a compiled
//! template is a plain tree with no shared or mutable state.

use indexmap::IndexMap;

use crate::{function::Function, path::Path, value::Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal string, number, boolean or null
    Constant(Value),
    /// Object literal; evaluated field by field
    Object(IndexMap<String, Field>),
    /// Array literal; evaluated element by element
    Array(Vec<Node>),
    /// Bare query
    Query(Query),
    /// `range` generator
    Generator(Generator),
    /// Host function call
    Call(Call),
}

/// Object member: its value and the annotation it was declared with.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub value: Node,
    pub annotation: Option<String>,
}

impl Field {
    pub fn new(value: Node) -> Self {
        Field {
            value,
            annotation: None,
        }
    }

    pub fn annotated(value: Node, annotation: impl Into<String>) -> Self {
        Field {
            value,
            annotation: Some(annotation.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub path: Path,
}

impl Query {
    pub fn new(path: Path) -> Self {
        Query { path }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    /// Query whose matches drive the repetition
    pub over: Query,
    /// Sub-template evaluated once per match, with `$` bound to the match
    pub template: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Name used in the template, for error messages
    pub name: String,
    pub function: Function,
    pub args: Vec<Node>,
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Constant(value)
    }
}
