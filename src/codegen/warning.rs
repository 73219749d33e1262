//! Non-fatal findings attached to a successful translation.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Ambiguous,
    DivisionByZero,
    VariableDivisor,
    LargeRange,
    UndefinedVariable,
    InfiniteLoop,
    MultipleStatements,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Warning {
    pub fn new(kind: WarningKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn ambiguous() -> Self {
        Self::new(
            WarningKind::Ambiguous,
            Severity::Medium,
            "Input may be ambiguous or unclear",
        )
        .with_suggestion("Try being more specific about the operation you want to perform")
    }

    pub fn division_by_zero(divisor: &str) -> Self {
        Self::new(
            WarningKind::DivisionByZero,
            Severity::High,
            format!("Division by zero: the divisor {divisor} is always zero"),
        )
        .with_suggestion("Use a non-zero divisor")
    }

    pub fn variable_divisor(name: &str) -> Self {
        Self::new(
            WarningKind::VariableDivisor,
            Severity::Medium,
            format!("Division by variable '{name}': watch out for division by zero"),
        )
        .with_suggestion("Ensure divisor is not zero before executing")
    }

    pub fn large_range(count: &str) -> Self {
        Self::new(
            WarningKind::LargeRange,
            Severity::Medium,
            format!("Large range operation detected: range({count})"),
        )
        .with_suggestion("Consider if this large range is intentional")
    }

    pub fn undefined_variables(names: &[&str]) -> Self {
        Self::new(
            WarningKind::UndefinedVariable,
            Severity::High,
            format!("Potentially undefined variables: {}", names.join(", ")),
        )
        .with_suggestion("Make sure these variables are defined before use")
    }

    pub fn infinite_loop() -> Self {
        Self::new(
            WarningKind::InfiniteLoop,
            Severity::High,
            "Code contains potential infinite loop",
        )
        .with_suggestion("Ensure loop has proper exit condition")
    }

    pub fn statements_processed(count: usize) -> Self {
        Self::new(
            WarningKind::MultipleStatements,
            Severity::Info,
            format!("Processed {count} statements"),
        )
    }

    /// `[SEVERITY] message`, then `Suggestion: …` when there is one.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        if let Some(suggestion) = &self.suggestion {
            lines.push(format!("Suggestion: {suggestion}"));
        }
        lines
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}
