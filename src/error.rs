//! Rich diagnostic error types for eng2py.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives. [`TranslateError`] carries the user-facing failure of one
//! `translate` call; its `Display` text is the message shown to the user, so
//! every variant spells out what went wrong and what to try instead.

use miette::Diagnostic;
use thiserror::Error;

use crate::codegen::SynthesisError;
use crate::config::ConfigError;
use crate::grammar::GrammarError;
use crate::sandbox::SandboxError;

/// Top-level error type for eng2py.
#[derive(Debug, Error, Diagnostic)]
pub enum Eng2PyError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sandbox(#[from] SandboxError),
}

// ---------------------------------------------------------------------------
// Translation errors
// ---------------------------------------------------------------------------

/// Why a translation failed.
///
/// `examples` and `suggestions` fields hold pre-rendered example text (see
/// [`crate::pipeline::suggest`]) so the message is complete on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TranslateError {
    #[error(
        "Input cannot be empty. Please enter an English instruction to translate.{examples}"
    )]
    #[diagnostic(code(eng2py::translate::empty))]
    Empty { examples: String },

    #[error(
        "Input is too short to be meaningful. Please provide a complete instruction.{examples}"
    )]
    #[diagnostic(code(eng2py::translate::too_short))]
    TooShort { examples: String },

    #[error(
        "Input is too long ({length} characters). Please keep instructions under {max} characters.{examples}"
    )]
    #[diagnostic(
        code(eng2py::translate::too_long),
        help("Split long input into several lines; each line is translated on its own.")
    )]
    TooLong {
        length: usize,
        max: usize,
        examples: String,
    },

    #[error(
        "Input contains potentially unsafe content that cannot be translated.\n\n\
         Please avoid using Python-specific keywords or system commands. \
         Focus on basic operations like arithmetic, assignments, and data manipulation."
    )]
    #[diagnostic(code(eng2py::translate::unsafe_content))]
    UnsafeContent { pattern: String },

    #[error("Unable to recognize a translatable pattern in your input.{suggestions}")]
    #[diagnostic(code(eng2py::translate::unrecognized))]
    UnrecognizedPattern { suggestions: String },

    #[error(
        "Failed to generate Python code: {cause}\n\n\
         This might be due to ambiguous or incomplete instructions. \
         Try being more specific about what you want to accomplish."
    )]
    #[diagnostic(code(eng2py::translate::generation))]
    Generation { cause: GenerationCause },

    #[error("Generated code has a syntax error at line {line}: {message}")]
    #[diagnostic(
        code(eng2py::translate::invalid_syntax),
        help("This is a bug in a code template. Please report the input that triggered it.")
    )]
    InvalidSyntax {
        line: usize,
        message: String,
        code: String,
    },

    #[error("Error in statement {index} ('{text}'): {error}")]
    #[diagnostic(
        code(eng2py::translate::statement),
        help("Statements are numbered from 1. Fix or remove the failing one.")
    )]
    Statement {
        index: usize,
        text: String,
        error: Box<TranslateError>,
    },
}

impl TranslateError {
    /// The innermost error, looking through [`TranslateError::Statement`].
    pub fn root(&self) -> &TranslateError {
        match self {
            Self::Statement { error, .. } => error.root(),
            other => other,
        }
    }
}

/// What went wrong between classification and a parsed fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GenerationCause {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("the instruction carried no operations, conditions, or variables")]
    #[diagnostic(code(eng2py::translate::incomplete))]
    Incomplete,
}

impl From<GrammarError> for TranslateError {
    fn from(e: GrammarError) -> Self {
        Self::Generation { cause: e.into() }
    }
}

impl From<SynthesisError> for TranslateError {
    fn from(e: SynthesisError) -> Self {
        match e {
            SynthesisError::Syntax { code, source } => Self::InvalidSyntax {
                line: source.line,
                message: source.message,
                code,
            },
            other => Self::Generation {
                cause: other.into(),
            },
        }
    }
}

/// Result type for translation steps.
pub type TranslateResult<T> = std::result::Result<T, TranslateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pysyntax::SyntaxError;

    #[test]
    fn synthesis_syntax_error_becomes_invalid_syntax() {
        let e: TranslateError = SynthesisError::Syntax {
            code: "class = 5".into(),
            source: SyntaxError::new(1, "invalid syntax"),
        }
        .into();
        assert_eq!(
            e.to_string(),
            "Generated code has a syntax error at line 1: invalid syntax"
        );
    }

    #[test]
    fn other_synthesis_errors_are_generation_failures() {
        let e: TranslateError = SynthesisError::UnknownAction {
            phrase: "dance".into(),
        }
        .into();
        assert!(
            e.to_string()
                .starts_with("Failed to generate Python code: don't know how to do \"dance\"")
        );
    }

    #[test]
    fn statement_error_names_index_and_text() {
        let inner = TranslateError::UnrecognizedPattern {
            suggestions: String::new(),
        };
        let e = TranslateError::Statement {
            index: 2,
            text: "hello world".into(),
            error: Box::new(inner.clone()),
        };
        assert_eq!(
            e.to_string(),
            "Error in statement 2 ('hello world'): Unable to recognize a translatable pattern in your input."
        );
        assert_eq!(e.root(), &inner);
    }
}
