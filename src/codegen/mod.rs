//! Python code synthesis from parsed instructions.
//!
//! ```text
//! ParsedInstruction ──→ Synthesizer ──→ fragment text ──→ pysyntax::parse
//!                          │   │                              │
//!                 literal.rs   action.rs                   lint.rs
//!               condition.rs   (then/else/body)          (warnings)
//! ```
//!
//! Bare words are resolved against a [`SymbolTable`] of names bound so far:
//! known names are emitted as identifiers, everything else as strings.

pub mod action;
pub mod condition;
pub mod error;
pub mod lint;
pub mod literal;
pub mod symbols;
pub mod synth;
pub mod warning;

pub use error::{SynthesisError, SynthesisResult};
pub use lint::{LintReport, lint};
pub use symbols::SymbolTable;
pub use synth::{Fragment, Synthesizer};
pub use warning::{Severity, Warning, WarningKind};
