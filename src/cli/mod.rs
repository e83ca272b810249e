//! CLI support for jsontemplate
//!
//! Provides programmatic access to the command line tool so the render loop
//! can be embedded in other programs.

mod render;

pub use render::{RenderOptions, RenderResult, execute_render, stream_render};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Template failed to compile
    #[error("Template error: {0}")]
    Compile(#[from] crate::CompileError),
    /// Evaluation error
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),
    /// Failure while streaming documents through a template
    #[error("Render error: {0}")]
    Render(#[source] crate::Error),
    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// No input provided
    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,
}

// Unwraps the library error so compile and evaluation failures keep their own messages.
impl From<crate::Error> for CliError {
    fn from(e: crate::Error) -> Self {
        match e {
            crate::Error::Compile(e) => CliError::Compile(e),
            crate::Error::Eval(e) => CliError::Eval(e),
            crate::Error::Io(e) => CliError::Io(e),
            other => CliError::Render(other),
        }
    }
}
