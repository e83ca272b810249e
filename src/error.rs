use std::io;

use thiserror::Error;

use crate::{builder::CompileError, evaluator::EvalError};

/// Any failure of the reader/writer based entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("while rendering: {0}")]
    Eval(#[from] EvalError),

    #[error("invalid input: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
