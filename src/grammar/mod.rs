//! Pattern-driven recognition of English instructions.
//!
//! ## Architecture
//!
//! ```text
//! sentence ──→ classify ──→ extract ──→ ParsedInstruction
//!                 │            │              │
//!            catalog.rs   scan + slots   confidence.rs
//!          (ordered regex
//!           per category)
//! ```
//!
//! Categories are tried in a fixed order (conditional, loop, data
//! operation, assignment, arithmetic) and, within a category, patterns are
//! tried by ascending priority. The first match wins.
//!
//! ## Usage
//!
//! ```rust
//! use eng2py::config::TranslatorConfig;
//! use eng2py::grammar::{Category, classify, extract};
//!
//! let stopwords = TranslatorConfig::default().stopword_set();
//! let text = "add 5 and 3";
//! let classification = classify(text);
//! assert_eq!(classification.category, Category::Arithmetic);
//! let parsed = extract(text, &classification, &stopwords).unwrap();
//! assert_eq!(parsed.operations()[0].operands, ["5", "3"]);
//! ```

pub mod catalog;
pub mod classify;
pub mod confidence;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod model;

pub use catalog::{Category, Tag};
pub use classify::{Classification, classify};
pub use error::{GrammarError, GrammarResult};
pub use extract::extract;
pub use matcher::{PatternMatch, match_category};
pub use model::{
    Condition, ConditionKind, DataKind, Literal, LoopKind, Metadata, Operation, OperationKind,
    ParsedInstruction,
};
