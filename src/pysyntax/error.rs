//! Diagnostics for the Python syntax check.

use miette::Diagnostic;
use thiserror::Error;

/// A fragment failed to tokenize or parse.
///
/// Line numbers are 1-based and refer to the checked fragment, not to the
/// user's original English input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("line {line}: {message}")]
#[diagnostic(
    code(eng2py::pysyntax::invalid),
    help(
        "The fragment is not valid Python. If it was produced by the translator, \
         the instruction probably contains words that cannot become identifiers \
         or expressions. Rephrase it using one of the supported patterns."
    )
)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Result type for syntax checking.
pub type SyntaxResult<T> = std::result::Result<T, SyntaxError>;
