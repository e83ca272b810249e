//! Turns a parsed template into an executable [`Node`] tree.
//!
//! Building resolves every function name against a [`FunctionMap`], checks
//! call arity, and compiles every query, so that a template that builds can
//! only fail at render time because of its input data.

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    ast::{AnnotatedField, Expr},
    function::{Binding, FunctionMap},
    lexer::Position,
    node::{Call, Field, Generator, Node, Query},
    parser::ParseError,
    path::{Path, PathError},
    value::Value,
};

/// Errors that make a template unusable. Fix the source or the functions and
/// compile again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid query '{query}' at {position}: {source}")]
    Query {
        query: String,
        position: Position,
        source: PathError,
    },

    #[error("no such function: {name} (at {position})")]
    UnknownFunction { name: String, position: Position },

    #[error("{name} is not a function (at {position})")]
    NotCallable { name: String, position: Position },

    #[error("{name} has a signature that no call can satisfy (at {position})")]
    InvalidSignature { name: String, position: Position },

    #[error("{function} expects {expected} argument(s), found {found} (at {position})")]
    Arity {
        function: String,
        expected: String,
        found: usize,
        position: Position,
    },
}

pub struct Builder<'f> {
    functions: &'f FunctionMap,
}

impl<'f> Builder<'f> {
    pub fn new(functions: &'f FunctionMap) -> Self {
        Builder { functions }
    }

    pub fn build(&self, expr: Expr) -> Result<Node, CompileError> {
        match expr {
            Expr::String(s) => Ok(Node::Constant(Value::String(s))),
            Expr::Number(n) => Ok(Node::Constant(Value::Number(n))),
            Expr::Bool(b) => Ok(Node::Constant(Value::Boolean(b))),
            Expr::Null => Ok(Node::Constant(Value::Null)),
            Expr::Object(fields) => self.build_object(fields),
            Expr::Array(items) => items
                .into_iter()
                .map(|item| self.build(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Node::Array),
            Expr::Extractor { query, position } => {
                Ok(Node::Query(self.build_query(query, position)?))
            }
            Expr::Generator {
                range,
                template,
                position,
            } => Ok(Node::Generator(Generator {
                over: self.build_query(range, position)?,
                template: Box::new(self.build(*template)?),
            })),
            Expr::Call {
                name,
                args,
                position,
            } => self.build_call(name, args, position),
        }
    }

    fn build_object(&self, fields: Vec<AnnotatedField>) -> Result<Node, CompileError> {
        let mut res = IndexMap::with_capacity(fields.len());
        for field in fields {
            // Later duplicates replace earlier ones.
            res.insert(
                field.key,
                Field {
                    value: self.build(field.value)?,
                    annotation: field.annotation,
                },
            );
        }
        Ok(Node::Object(res))
    }

    fn build_query(&self, query: String, position: Position) -> Result<Query, CompileError> {
        match Path::compile(&query) {
            Ok(path) => Ok(Query::new(path)),
            Err(source) => Err(CompileError::Query {
                query,
                position,
                source,
            }),
        }
    }

    fn build_call(
        &self,
        name: String,
        args: Vec<Expr>,
        position: Position,
    ) -> Result<Node, CompileError> {
        let function = match self.functions.get(&name) {
            None => return Err(CompileError::UnknownFunction { name, position }),
            Some(Binding::Value(_)) => return Err(CompileError::NotCallable { name, position }),
            Some(Binding::Function(function)) => function.clone(),
        };

        let signature = function.signature();
        if !signature.is_well_formed() {
            return Err(CompileError::InvalidSignature { name, position });
        }
        if !signature.accepts_arity(args.len()) {
            return Err(CompileError::Arity {
                expected: signature.arity(),
                found: args.len(),
                function: name,
                position,
            });
        }

        let args = args
            .into_iter()
            .map(|arg| self.build(arg))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Node::Call(Call {
            name,
            function,
            args,
        }))
    }
}
