// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # eng2py
//!
//! Rule-based translation of short English instructions into Python
//! fragments, with a syntax check on everything it emits.
//!
//! ## Architecture
//!
//! - **Grammar** (`grammar`): pattern catalog, sentence classifier, slot extraction
//!   into a [`grammar::ParsedInstruction`], confidence scoring
//! - **Code synthesis** (`codegen`): per-category templates, literal coercion,
//!   condition rewriting, post-hoc warnings
//! - **Syntax check** (`pysyntax`): lexer and parser for the Python subset
//!   fragments are written in
//! - **Pipeline** (`pipeline`): input validation, multi-statement splitting, the
//!   [`pipeline::Translator`] entry point
//! - **Sandbox** (`sandbox`): optional execution of a fragment in a separate
//!   interpreter process
//!
//! ## Library usage
//!
//! ```
//! use eng2py::pipeline::Translator;
//!
//! let translator = Translator::default();
//! let outcome = translator.translate("add 5 and 3");
//! assert_eq!(outcome.code(), Some("result = 5 + 3"));
//!
//! let outcome = translator.translate("hello world");
//! assert!(!outcome.is_success());
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod grammar;
pub mod pipeline;
pub mod pysyntax;
pub mod sandbox;
