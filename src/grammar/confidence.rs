//! Heuristic confidence score for a parsed instruction.
//!
//! The score only drives an advisory "may be ambiguous" warning; it never
//! changes what gets generated.

use super::catalog::Category;
use super::model::ParsedInstruction;

// Weights in tenths so the sum is exact.
const RECOGNISED: u32 = 5;
const HAS_OPERATION: u32 = 3;
const HAS_CONDITION: u32 = 3;
const HAS_VARIABLE: u32 = 2;

/// Score in `[0.0, 1.0]`.
pub fn score(instruction: &ParsedInstruction) -> f64 {
    let mut tenths = 0;
    if instruction.category() != Category::Unknown {
        tenths += RECOGNISED;
    }
    if !instruction.operations().is_empty() {
        tenths += HAS_OPERATION;
    }
    if !instruction.conditions().is_empty() {
        tenths += HAS_CONDITION;
    }
    if !instruction.variables().is_empty() {
        tenths += HAS_VARIABLE;
    }
    f64::from(tenths.min(10)) / 10.0
}
