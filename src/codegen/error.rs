//! Diagnostic error types for code synthesis.

use miette::Diagnostic;
use thiserror::Error;

use crate::grammar::{Category, OperationKind};
use crate::pysyntax::SyntaxError;

/// Errors produced while turning a [`ParsedInstruction`] into Python.
///
/// [`ParsedInstruction`]: crate::grammar::ParsedInstruction
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SynthesisError {
    #[error("cannot generate code for an unrecognised instruction")]
    #[diagnostic(
        code(eng2py::codegen::unknown_category),
        help("Only classified instructions can be synthesized.")
    )]
    UnknownCategory,

    #[error("{kind} needs at least {needed} operands, found {found}")]
    #[diagnostic(
        code(eng2py::codegen::missing_operands),
        help("Name both values, e.g. \"add 5 and 3\".")
    )]
    MissingOperands {
        kind: OperationKind,
        needed: usize,
        found: usize,
    },

    #[error("the instruction has no {slot}")]
    #[diagnostic(
        code(eng2py::codegen::missing_slot),
        help("The sentence matched a template but left out a required part.")
    )]
    MissingSlot { slot: &'static str },

    #[error("no value given for '{name}'")]
    #[diagnostic(
        code(eng2py::codegen::missing_value),
        help("Say what the variable should hold, e.g. \"set x to 10\".")
    )]
    MissingValue { name: String },

    #[error("don't know how to do \"{phrase}\"")]
    #[diagnostic(
        code(eng2py::codegen::unknown_action),
        help(
            "Supported actions: print X, increment X [by N], decrement X [by N], \
             add N to X, subtract N from X, remove V from X, set X to V, do nothing, \
             break, continue. Separate several actions with ';'."
        )
    )]
    UnknownAction { phrase: String },

    #[error("{category} instruction produced no code")]
    #[diagnostic(
        code(eng2py::codegen::empty_fragment),
        help("The instruction was recognised but carried nothing to emit.")
    )]
    EmptyFragment { category: Category },

    #[error("generated code is invalid at line {}: {}", .source.line, .source.message)]
    #[diagnostic(
        code(eng2py::codegen::invalid_syntax),
        help("This is a bug in a code template. Please report the input that triggered it.")
    )]
    Syntax {
        code: String,
        #[source]
        source: SyntaxError,
    },
}

/// Result type for synthesis operations.
pub type SynthesisResult<T> = std::result::Result<T, SynthesisError>;
