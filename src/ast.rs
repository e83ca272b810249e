//! # Template Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the template
//! language: a superset of JSON in which values may be computed from input
//! data.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Value nodes (literals, objects, arrays, queries,
//!   generators, function calls)
//!
//! ## Quick Start
//!
//! ```text
//! {
//!     # Pick an individual field.
//!     "color": $.store.bicycle.color,
//!
//!     # Map a list of objects.
//!     "prices": range $.store.book[*] [
//!         { "title": $.title, "price": $.price },
//!     ],
//!
//!     "average": avg($..price),
//! }
//! ```
//!
//! ## Additions to JSON
//!
//! - **Queries** `$...` - replaced by the data they select. A query matching
//!   one value yields that value, several values yield an array, none yields
//!   null.
//! - **Generators** `range <query> [ <value> ]` - evaluate the sub-template
//!   once per match, with `$` bound to the match, yielding an array.
//! - **Function calls** `name(<value>, ...)` - invoke a host function.
//! - **Annotations** `@label` before an object key - metadata, stripped from
//!   the output.
//! - **Comments** from `#` to the end of the line.
//! - **Trailing commas** after the last object field or array element.
pub mod expressions;
pub mod tokens;

pub use expressions::{AnnotatedField, Expr};
pub use tokens::Token;
