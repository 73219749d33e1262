//! Static checks over a generated fragment.
//!
//! The lint walks the parsed fragment in execution order, binding names as
//! assignments and loops introduce them, and reports names read before any
//! binding, unbounded `while` loops, very large `range(N)` literals, and
//! risky divisors. String contents are never inspected.

use std::collections::BTreeSet;

use crate::pysyntax::{Expr, Stmt};

use super::symbols::SymbolTable;
use super::warning::Warning;

/// Names Python provides without an import.
const BUILTINS: &[&str] = &[
    "print", "len", "range", "str", "int", "float", "list", "dict", "input", "sum", "min",
    "max", "abs", "round", "sorted", "bool", "type", "set", "tuple", "enumerate", "zip",
    "reversed", "any", "all", "map", "filter", "isinstance",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LintReport {
    pub warnings: Vec<Warning>,
    /// Names the fragment binds.
    pub defined: BTreeSet<String>,
}

/// Check `module`, treating every name in `known` as already bound.
pub fn lint(module: &[Stmt], known: &SymbolTable, large_range_threshold: u64) -> LintReport {
    let mut walker = Walker {
        visible: known.names().map(str::to_string).collect(),
        bound: BTreeSet::new(),
        undefined: BTreeSet::new(),
        infinite_loop: false,
        large_ranges: Vec::new(),
        zero_divisors: Vec::new(),
        variable_divisors: Vec::new(),
        threshold: large_range_threshold,
    };
    walker.block(module);
    walker.into_report()
}

struct Walker {
    visible: BTreeSet<String>,
    bound: BTreeSet<String>,
    undefined: BTreeSet<String>,
    infinite_loop: bool,
    large_ranges: Vec<String>,
    zero_divisors: Vec<String>,
    variable_divisors: Vec<String>,
    threshold: u64,
}

impl Walker {
    fn block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { targets, value } => {
                self.read(value);
                for target in targets {
                    self.bind(target);
                }
            }
            Stmt::AugAssign { target, op, value } => {
                self.read(value);
                self.read(target);
                if op.is_division() {
                    self.divisor(value);
                }
            }
            Stmt::Expr(expr) => self.read(expr),
            Stmt::If { test, body, orelse } => {
                self.read(test);
                self.block(body);
                self.block(orelse);
            }
            Stmt::While { test, body, orelse } => {
                self.read(test);
                if is_truthy_constant(test) && !body.iter().any(|s| matches!(s, Stmt::Break)) {
                    self.infinite_loop = true;
                }
                self.block(body);
                self.block(orelse);
            }
            Stmt::For {
                target,
                iter,
                body,
                orelse,
            } => {
                self.read(iter);
                self.bind(target);
                self.block(body);
                self.block(orelse);
            }
            Stmt::Pass | Stmt::Break | Stmt::Continue => {}
        }
    }

    fn bind(&mut self, target: &Expr) {
        match target {
            Expr::Name(name) => {
                self.visible.insert(name.clone());
                self.bound.insert(name.clone());
            }
            Expr::Tuple(items) | Expr::List(items) => {
                for item in items {
                    self.bind(item);
                }
            }
            Expr::Starred(inner) => self.bind(inner),
            Expr::Attribute { value, .. } => self.read(value),
            Expr::Subscript { value, index } => {
                self.read(value);
                self.read(index);
            }
            other => self.read(other),
        }
    }

    fn read(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) => {
                if !self.visible.contains(name) && !BUILTINS.contains(&name.as_str()) {
                    self.undefined.insert(name.clone());
                }
            }
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Bool(_) | Expr::NoneLit => {}
            Expr::List(items) | Expr::Tuple(items) | Expr::Set(items) => {
                for item in items {
                    self.read(item);
                }
            }
            Expr::Dict(pairs) => {
                for (key, value) in pairs {
                    self.read(key);
                    self.read(value);
                }
            }
            Expr::BinOp { left, op, right } => {
                self.read(left);
                self.read(right);
                if op.is_division() {
                    self.divisor(right);
                }
            }
            Expr::UnaryOp { operand, .. } => self.read(operand),
            Expr::BoolOp { values, .. } => {
                for value in values {
                    self.read(value);
                }
            }
            Expr::Compare { left, comparisons } => {
                self.read(left);
                for (_, right) in comparisons {
                    self.read(right);
                }
            }
            Expr::IfExp { test, body, orelse } => {
                self.read(test);
                self.read(body);
                self.read(orelse);
            }
            Expr::Call {
                func,
                args,
                keywords,
            } => {
                self.read(func);
                if matches!(func.as_ref(), Expr::Name(name) if name == "range") {
                    for arg in args {
                        if let Expr::Int(text) = arg {
                            if exceeds(text, self.threshold) {
                                self.large_ranges.push(text.clone());
                            }
                        }
                    }
                }
                for arg in args {
                    self.read(arg);
                }
                for (_, value) in keywords {
                    self.read(value);
                }
            }
            Expr::Attribute { value, .. } => self.read(value),
            Expr::Subscript { value, index } => {
                self.read(value);
                self.read(index);
            }
            Expr::Slice { lower, upper, step } => {
                for part in [lower, upper, step].into_iter().flatten() {
                    self.read(part);
                }
            }
            Expr::Starred(inner) => self.read(inner),
        }
    }

    fn divisor(&mut self, divisor: &Expr) {
        match divisor {
            Expr::Name(name) => {
                if !self.variable_divisors.contains(name) {
                    self.variable_divisors.push(name.clone());
                }
            }
            Expr::Int(text) | Expr::Float(text) if divisor.is_zero_literal() => {
                if !self.zero_divisors.contains(text) {
                    self.zero_divisors.push(text.clone());
                }
            }
            _ => {}
        }
    }

    fn into_report(self) -> LintReport {
        let mut warnings = Vec::new();
        for divisor in &self.zero_divisors {
            warnings.push(Warning::division_by_zero(divisor));
        }
        if !self.undefined.is_empty() {
            let names: Vec<&str> = self.undefined.iter().map(String::as_str).collect();
            warnings.push(Warning::undefined_variables(&names));
        }
        if self.infinite_loop {
            warnings.push(Warning::infinite_loop());
        }
        for count in &self.large_ranges {
            warnings.push(Warning::large_range(count));
        }
        for name in &self.variable_divisors {
            warnings.push(Warning::variable_divisor(name));
        }
        LintReport {
            warnings,
            defined: self.bound,
        }
    }
}

fn is_truthy_constant(test: &Expr) -> bool {
    match test {
        Expr::Bool(value) => *value,
        Expr::Int(_) | Expr::Float(_) => !test.is_zero_literal(),
        Expr::Str(text) => !text.is_empty(),
        _ => false,
    }
}

/// Whether a decimal integer literal is above `threshold`. Literals too
/// large for `u64` count as exceeding it.
fn exceeds(text: &str, threshold: u64) -> bool {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    digits.parse::<u64>().map_or(true, |value| value > threshold)
}
