pub mod ast;
pub mod builder;
pub mod builtins;
#[cfg(feature = "cli")]
pub mod cli;
pub mod convert;
pub mod error;
pub mod evaluator;
pub mod function;
pub mod lexer;
pub mod node;
pub mod output;
pub mod parser;
pub mod path;
pub mod template;
pub mod value;

pub use ast::{AnnotatedField, Expr, Token};
pub use builder::{Builder, CompileError};
pub use error::{Error, Result};
pub use evaluator::{EvalError, MissingKeyPolicy};
pub use function::{Binding, Function, FunctionError, FunctionMap, Kind, Signature};
pub use lexer::{LexError, Lexer, Position};
pub use node::Node;
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use path::{Path, PathError};
pub use template::Template;
pub use value::Value;
