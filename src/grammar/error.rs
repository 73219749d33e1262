//! Diagnostic error types for pattern matching and slot extraction.

use miette::Diagnostic;
use thiserror::Error;

use super::catalog::Tag;

/// Errors produced while turning a matched sentence into a [`ParsedInstruction`].
///
/// [`ParsedInstruction`]: super::model::ParsedInstruction
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GrammarError {
    #[error("instruction text must not be empty")]
    #[diagnostic(
        code(eng2py::grammar::empty_instruction),
        help("Every parsed instruction needs the sentence it came from. Pass non-blank text.")
    )]
    EmptyInstruction,

    #[error("condition text must not be empty")]
    #[diagnostic(
        code(eng2py::grammar::empty_condition),
        help(
            "A condition clause was matched but captured nothing. \
             Write the comparison out in full, e.g. \"if x greater than 5 then print yes\"."
        )
    )]
    EmptyCondition,

    #[error("unknown operation kind: \"{kind}\"")]
    #[diagnostic(
        code(eng2py::grammar::invalid_operation),
        help(
            "Operation kinds are a closed set: add, subtract, multiply, divide, assign, \
             create, append, remove, update, get."
        )
    )]
    InvalidOperationKind { kind: String },

    #[error("pattern '{tag}' did not capture the {slot}")]
    #[diagnostic(
        code(eng2py::grammar::missing_slot),
        help(
            "The sentence matched a template but one of its parts is missing. \
             Compare your wording with the examples for this kind of instruction."
        )
    )]
    MissingSlot { tag: Tag, slot: &'static str },

    #[error("invalid repeat count \"{count}\"")]
    #[diagnostic(
        code(eng2py::grammar::invalid_count),
        help("Repeat counts must be whole numbers, e.g. \"repeat 3 times print hello\".")
    )]
    InvalidCount { count: String },
}

/// Result type for grammar operations.
pub type GrammarResult<T> = std::result::Result<T, GrammarError>;
