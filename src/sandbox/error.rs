//! Diagnostic error types for the execution sandbox.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SandboxError {
    #[error("failed to start interpreter \"{interpreter}\"")]
    #[diagnostic(
        code(eng2py::sandbox::spawn),
        help(
            "Install Python 3 or point `sandbox.interpreter` in the config file \
             at a working interpreter."
        )
    )]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while {context}")]
    #[diagnostic(code(eng2py::sandbox::io))]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("execution timed out after {seconds}s")]
    #[diagnostic(
        code(eng2py::sandbox::timeout),
        help("The program was stopped. Check loops for an exit condition, or raise `sandbox.timeout_secs`.")
    )]
    Timeout { seconds: f64 },

    #[error("input handler failed: {message}")]
    #[diagnostic(code(eng2py::sandbox::input))]
    InputHandler { message: String },

    #[error("input handler panicked")]
    #[diagnostic(code(eng2py::sandbox::input_panic))]
    InputHandlerPanicked,
}

pub type SandboxResult<T> = std::result::Result<T, SandboxError>;
