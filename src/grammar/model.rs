//! The structured record produced for each instruction.
//!
//! A [`ParsedInstruction`] is built by the extractor, then read by the
//! confidence scorer and the synthesizer. Construction enforces the record's
//! invariants: non-empty source text, non-empty condition text, and a closed
//! set of operation kinds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::catalog::{Category, Tag};
use super::error::{GrammarError, GrammarResult};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap());
static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""[^"]*"|'[^']*'"#).unwrap());
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(?:\d+\.\d+|\.\d+)$").unwrap());

/// Words that never count as variables inside a condition clause.
const CONDITION_KEYWORDS: &[&str] = &[
    "and", "or", "not", "is", "than", "equal", "equals", "greater", "less", "more", "fewer",
    "to", "at", "least", "most", "in", "true", "false", "none", "does",
];

// ── Operations ─────────────────────────────────────────────────────────

/// The closed set of operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Assign,
    Create,
    Append,
    Remove,
    Update,
    Get,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Assign,
        Self::Create,
        Self::Append,
        Self::Remove,
        Self::Update,
        Self::Get,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Assign => "assign",
            Self::Create => "create",
            Self::Append => "append",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::Get => "get",
        }
    }

    /// Infix operator for arithmetic kinds.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Self::Add => Some("+"),
            Self::Subtract => Some("-"),
            Self::Multiply => Some("*"),
            Self::Divide => Some("/"),
            _ => None,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        self.symbol().is_some()
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| GrammarError::InvalidOperationKind { kind: s.to_string() })
    }
}

/// One operation to emit, with operands kept as raw text until synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub operands: Vec<String>,
    pub result_variable: Option<String>,
}

impl Operation {
    pub fn new(kind: OperationKind, operands: Vec<String>, result_variable: Option<String>) -> Self {
        Self {
            kind,
            operands,
            result_variable,
        }
    }

    /// Build from a kind name, failing for anything outside the closed set.
    pub fn from_kind_name(
        kind: &str,
        operands: Vec<String>,
        result_variable: Option<String>,
    ) -> GrammarResult<Self> {
        Ok(Self::new(kind.parse()?, operands, result_variable))
    }
}

// ── Conditions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    If,
    /// Emitted as `if not (…)`.
    Unless,
    While,
}

/// A raw condition clause and the identifiers it mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    text: String,
    kind: ConditionKind,
    referenced_variables: Vec<String>,
}

impl Condition {
    pub fn new(text: impl Into<String>, kind: ConditionKind) -> GrammarResult<Self> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(GrammarError::EmptyCondition);
        }
        let referenced_variables = referenced_variables(&text);
        Ok(Self {
            text,
            kind,
            referenced_variables,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    pub fn referenced_variables(&self) -> &[String] {
        &self.referenced_variables
    }
}

/// Identifier-shaped words outside quotes, minus comparison vocabulary,
/// in first-seen order.
fn referenced_variables(text: &str) -> Vec<String> {
    let unquoted = QUOTED.replace_all(text, " ");
    let mut names: Vec<String> = Vec::new();
    for m in IDENTIFIER.find_iter(&unquoted) {
        let word = m.as_str();
        if CONDITION_KEYWORDS.contains(&word.to_ascii_lowercase().as_str()) {
            continue;
        }
        if !names.iter().any(|n| n == word) {
            names.push(word.to_string());
        }
    }
    names
}

// ── Literals ───────────────────────────────────────────────────────────

/// A literal value recovered from the sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Literal {
    /// Interpret a raw value phrase. Numbers and booleans are recognised,
    /// surrounding quotes are stripped, anything else is kept as text.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if INTEGER.is_match(raw) {
            if let Ok(n) = raw.parse::<i64>() {
                return Some(Self::Int(n));
            }
        }
        if INTEGER.is_match(raw) || DECIMAL.is_match(raw) {
            if let Ok(f) = raw.parse::<f64>() {
                return Some(Self::Float(f));
            }
        }
        match raw.to_ascii_lowercase().as_str() {
            "true" => return Some(Self::Bool(true)),
            "false" => return Some(Self::Bool(false)),
            _ => {}
        }
        let unquoted = raw
            .strip_prefix('"')
            .and_then(|r| r.strip_suffix('"'))
            .or_else(|| raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')))
            .unwrap_or(raw);
        Some(Self::Text(unquoted.to_string()))
    }
}

// ── Metadata ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    Repeat,
    ForEach,
    While,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    List,
    Dict,
}

/// Synthesis hints that do not fit variables, operations, or conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub then_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub else_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_kind: Option<LoopKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_kind: Option<DataKind>,
    pub confidence: f64,
}

// ── Parsed instruction ─────────────────────────────────────────────────

/// Structured form of one instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedInstruction {
    original_text: String,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<Tag>,
    variables: BTreeMap<String, Option<Literal>>,
    operations: Vec<Operation>,
    conditions: Vec<Condition>,
    metadata: Metadata,
}

impl ParsedInstruction {
    pub fn new(
        original_text: impl Into<String>,
        category: Category,
        tag: Option<Tag>,
    ) -> GrammarResult<Self> {
        let original_text = original_text.into();
        if original_text.trim().is_empty() {
            return Err(GrammarError::EmptyInstruction);
        }
        Ok(Self {
            original_text,
            category,
            tag,
            variables: BTreeMap::new(),
            operations: Vec::new(),
            conditions: Vec::new(),
            metadata: Metadata::default(),
        })
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    pub fn variables(&self) -> &BTreeMap<String, Option<Literal>> {
        &self.variables
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn confidence(&self) -> f64 {
        self.metadata.confidence
    }

    /// Record a variable. A known value is never replaced by an unknown one.
    pub fn add_variable(&mut self, name: impl Into<String>, value: Option<Literal>) {
        let name = name.into();
        match self.variables.get_mut(&name) {
            Some(existing) => {
                if value.is_some() {
                    *existing = value;
                }
            }
            None => {
                self.variables.insert(name, value);
            }
        }
    }

    pub fn push_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn push_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Known category and at least one operation, condition, or variable.
    pub fn is_valid(&self) -> bool {
        self.category != Category::Unknown
            && (!self.operations.is_empty()
                || !self.conditions.is_empty()
                || !self.variables.is_empty())
    }
}
