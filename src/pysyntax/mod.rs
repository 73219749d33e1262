//! Syntax checking for generated Python.
//!
//! A tokenizer and recursive-descent parser for the statement and
//! expression forms the synthesizer emits (and a reasonable margin around
//! them). The resulting tree feeds the lint pass in [`crate::codegen`].

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, BoolOp, CmpOp, Expr, Stmt, UnaryOp};
pub use error::{SyntaxError, SyntaxResult};

/// Parse a fragment into its statement list.
pub fn parse(source: &str) -> SyntaxResult<Vec<Stmt>> {
    parser::parse_module(source)
}

/// Check that a fragment is syntactically valid without keeping the tree.
pub fn check(source: &str) -> SyntaxResult<()> {
    parse(source).map(|_| ())
}
