//! The translation pipeline: English text in, Python fragment or a
//! user-facing failure out.
//!
//! ```text
//! text ──→ validate ──→ split ──┬─→ segment 1: validate → classify → extract → synthesize
//!                               ├─→ segment 2: …                    (shared SymbolTable)
//!                               └─→ …
//!                                        │
//!                                        ▼
//!                      Outcome::Success { code, warnings } | Outcome::Failure { error }
//! ```
//!
//! A [`Translator`] owns an immutable [`TranslatorConfig`] and keeps no state
//! between calls, so one instance can serve many threads.

pub mod split;
pub mod suggest;
pub mod validate;

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::codegen::{SymbolTable, Synthesizer, Warning};
use crate::config::{ConfigResult, TranslatorConfig};
use crate::error::{GenerationCause, TranslateError, TranslateResult};
use crate::grammar::{ParsedInstruction, classify, extract};

pub use split::split_statements;
pub use suggest::{PatternGroup, SUPPORTED_PATTERNS};
pub use validate::validate;

static DEFAULT_BANNED: LazyLock<Vec<Regex>> =
    LazyLock::new(|| TranslatorConfig::default().compile_banned().unwrap());

/// Result of one [`Translator::translate`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `code` is non-empty and parses as Python.
    Success { code: String, warnings: Vec<Warning> },
    Failure { error: TranslateError },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Success { code, .. } => Some(code),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&TranslateError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            Self::Success { warnings, .. } => warnings,
            Self::Failure { .. } => &[],
        }
    }

    /// Warnings rendered one entry per line: `[SEVERITY] message`, then
    /// `Suggestion: …` where present.
    pub fn warning_lines(&self) -> Vec<String> {
        self.warnings().iter().flat_map(Warning::lines).collect()
    }

    /// Flat record for JSON output.
    pub fn report(&self) -> OutcomeReport {
        OutcomeReport {
            success: self.is_success(),
            code: self.code().map(str::to_string),
            error_message: self.error_message(),
            warnings: self.warning_lines(),
        }
    }
}

/// Serializable view of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub warnings: Vec<String>,
}

/// Code and warnings for one segment.
struct Translated {
    code: String,
    warnings: Vec<Warning>,
    defined: BTreeSet<String>,
}

/// English-to-Python translator.
#[derive(Debug, Clone)]
pub struct Translator {
    config: TranslatorConfig,
    banned: Vec<Regex>,
    stopwords: BTreeSet<String>,
}

impl Default for Translator {
    fn default() -> Self {
        let config = TranslatorConfig::default();
        Self {
            banned: DEFAULT_BANNED.clone(),
            stopwords: config.stopword_set(),
            config,
        }
    }
}

impl Translator {
    /// Build a translator, validating the config and compiling its banned
    /// patterns once.
    pub fn new(config: TranslatorConfig) -> ConfigResult<Self> {
        config.validate()?;
        let banned = config.compile_banned()?;
        let stopwords = config.stopword_set();
        Ok(Self {
            config,
            banned,
            stopwords,
        })
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// The read-only example catalog.
    pub fn supported_patterns(&self) -> &'static [PatternGroup] {
        SUPPORTED_PATTERNS
    }

    /// Translate `text`. Never panics and never returns `Err`: every failure
    /// is an [`Outcome::Failure`].
    pub fn translate(&self, text: &str) -> Outcome {
        match self.translate_all(text) {
            Ok((code, warnings)) => Outcome::Success { code, warnings },
            Err(error) => {
                debug!(error = %error, "translation failed");
                Outcome::Failure { error }
            }
        }
    }

    /// Parsed instructions for each statement of `text`, without synthesis.
    pub fn parse(&self, text: &str) -> TranslateResult<Vec<ParsedInstruction>> {
        validate(text, &self.config, &self.banned)?;
        let statements = split_statements(text);
        let many = statements.len() > 1;
        statements
            .iter()
            .enumerate()
            .map(|(i, statement)| {
                self.parse_statement(statement)
                    .map_err(|error| wrap(many, i, statement, error))
            })
            .collect()
    }

    fn translate_all(&self, text: &str) -> TranslateResult<(String, Vec<Warning>)> {
        validate(text, &self.config, &self.banned)?;
        let statements = split_statements(text);
        let many = statements.len() > 1;

        let mut symbols = SymbolTable::new();
        let mut codes = Vec::with_capacity(statements.len());
        let mut warnings = Vec::new();
        for (i, statement) in statements.iter().enumerate() {
            if !self.config.share_symbols_across_statements {
                symbols = SymbolTable::new();
            }
            let translated = self
                .translate_statement(statement, &symbols)
                .map_err(|error| wrap(many, i, statement, error))?;
            symbols.extend(translated.defined);
            codes.push(translated.code);
            warnings.extend(translated.warnings);
        }
        if many {
            warnings.push(Warning::statements_processed(statements.len()));
        }
        Ok((codes.join("\n"), warnings))
    }

    fn parse_statement(&self, statement: &str) -> TranslateResult<ParsedInstruction> {
        validate(statement, &self.config, &self.banned)?;
        let classification = classify(statement);
        if !classification.is_known() {
            return Err(TranslateError::UnrecognizedPattern {
                suggestions: suggest::unrecognized_suggestions(statement),
            });
        }
        let parsed = extract(statement, &classification, &self.stopwords)?;
        if !parsed.is_valid() {
            return Err(TranslateError::Generation {
                cause: GenerationCause::Incomplete,
            });
        }
        Ok(parsed)
    }

    fn translate_statement(
        &self,
        statement: &str,
        symbols: &SymbolTable,
    ) -> TranslateResult<Translated> {
        let parsed = self.parse_statement(statement)?;
        let mut warnings = Vec::new();
        if parsed.confidence() < self.config.ambiguity_threshold {
            warnings.push(Warning::ambiguous());
        }
        let fragment = Synthesizer::new(symbols)
            .with_large_range_threshold(self.config.large_range_threshold)
            .synthesize(&parsed)?;
        warnings.extend(fragment.warnings);
        Ok(Translated {
            code: fragment.code,
            warnings,
            defined: fragment.defined,
        })
    }
}

fn wrap(many: bool, index: usize, statement: &str, error: TranslateError) -> TranslateError {
    if many {
        TranslateError::Statement {
            index: index + 1,
            text: statement.to_string(),
            error: Box::new(error),
        }
    } else {
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::WarningKind;

    fn translate(text: &str) -> Outcome {
        Translator::default().translate(text)
    }

    #[test]
    fn success_carries_code() {
        let outcome = translate("add 5 and 3");
        assert!(outcome.is_success());
        assert_eq!(outcome.code(), Some("result = 5 + 3"));
        assert!(outcome.error_message().is_none());
    }

    #[test]
    fn failure_carries_message() {
        let outcome = translate("hello world");
        assert!(!outcome.is_success());
        assert!(outcome.code().is_none());
        let message = outcome.error_message().unwrap();
        assert!(message.starts_with("Unable to recognize a translatable pattern"));
        assert!(message.contains("add 5 and 3"));
    }

    #[test]
    fn symbols_flow_between_statements() {
        let outcome = translate("set total to 5\nif total greater than 3 then print total");
        assert_eq!(
            outcome.code(),
            Some("total = 5\nif total > 3:\n    print(total)")
        );
        assert!(
            !outcome
                .warnings()
                .iter()
                .any(|w| w.kind == WarningKind::UndefinedVariable)
        );
        assert_eq!(
            outcome.warnings().last().map(|w| w.kind),
            Some(WarningKind::MultipleStatements)
        );
    }

    #[test]
    fn symbols_can_be_isolated() {
        let translator = Translator::new(TranslatorConfig {
            share_symbols_across_statements: false,
            ..Default::default()
        })
        .unwrap();
        let outcome = translator.translate("set word to 5\nrepeat 2 times print word");
        assert_eq!(
            outcome.code(),
            Some("word = 5\nfor _ in range(2):\n    print(\"word\")")
        );
    }

    #[test]
    fn statement_failure_is_numbered() {
        let outcome = translate("set x to 1\nhello world\nset y to 2");
        let message = outcome.error_message().unwrap();
        assert!(message.starts_with("Error in statement 2 ('hello world'): "));
    }

    #[test]
    fn single_statement_errors_are_not_wrapped() {
        let outcome = translate("if x greater than 5 then dance");
        assert!(matches!(
            outcome.error(),
            Some(TranslateError::Generation { .. })
        ));
    }

    #[test]
    fn report_shape() {
        let report = translate("divide 10 by 0").report();
        assert!(report.success);
        assert_eq!(report.code.as_deref(), Some("result = 10 / 0"));
        assert!(report.warnings.iter().any(|w| w.starts_with("[HIGH] Division by zero")));
        assert!(report.warnings.iter().any(|w| w.starts_with("Suggestion: ")));
    }

    #[test]
    fn parse_exposes_instructions() {
        let parsed = Translator::default().parse("set x to 1\nadd x and 2").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].operations()[0].operands, ["x", "2"]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TranslatorConfig {
            banned_patterns: vec!["[".into()],
            ..Default::default()
        };
        assert!(Translator::new(config).is_err());
    }

    #[test]
    fn translator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Translator>();
    }
}
