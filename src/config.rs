//! Immutable configuration for the translator and the sandbox.
//!
//! Everything that used to be module-wide state (banned content, keyword
//! lists, thresholds) is an explicit value here. A [`Translator`] takes its
//! [`TranslatorConfig`] by value and never mutates it.
//!
//! [`Translator`]: crate::pipeline::Translator

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use miette::Diagnostic;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(eng2py::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(eng2py::config::parse),
        help("Check the TOML syntax. Unknown keys are ignored; every key is optional.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(eng2py::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid banned pattern \"{pattern}\": {message}")]
    #[diagnostic(
        code(eng2py::config::bad_pattern),
        help(
            "Banned patterns are Rust `regex` syntax, matched case-insensitively. \
             Look-around and back-references are not supported."
        )
    )]
    BadPattern { pattern: String, message: String },

    #[error("invalid config value for {field}: {message}")]
    #[diagnostic(code(eng2py::config::invalid), help("Fix the value and try again."))]
    Invalid {
        field: &'static str,
        message: String,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ── Translator ─────────────────────────────────────────────────────────

/// Settings for the translation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Minimum trimmed length in characters.
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    /// Maximum raw length in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Minimum number of whitespace-separated words.
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    /// Case-insensitive regexes that reject an input outright.
    #[serde(default = "default_banned_patterns")]
    pub banned_patterns: Vec<String>,
    /// Words the variable scan never records as names.
    #[serde(default = "default_scan_stopwords")]
    pub scan_stopwords: Vec<String>,
    /// Confidence below this attaches an ambiguity warning.
    #[serde(default = "default_ambiguity_threshold")]
    pub ambiguity_threshold: f64,
    /// `range(N)` above this attaches a performance warning.
    #[serde(default = "default_large_range_threshold")]
    pub large_range_threshold: u64,
    /// Let later statements of one input see names bound by earlier ones.
    #[serde(default = "default_share_symbols")]
    pub share_symbols_across_statements: bool,
}

fn default_min_chars() -> usize {
    3
}
fn default_max_chars() -> usize {
    1000
}
fn default_min_words() -> usize {
    2
}
fn default_banned_patterns() -> Vec<String> {
    [
        r"\bimport\s+os\b",
        r"\bexec\b",
        r"\beval\b",
        r"\b__\w+__\b",
        r"\bopen\s*\(",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_scan_stopwords() -> Vec<String> {
    [
        // Template keywords.
        "add", "subtract", "multiply", "divide", "plus", "minus", "times", "if", "then", "else",
        "when", "do", "while", "for", "each", "in", "repeat", "create", "set", "assign", "to",
        "with", "value", "list", "dictionary", "dict", "get", "from", "remove", "and", "or",
        // Connectives and phrasing the templates tolerate.
        "a", "an", "the", "of", "by", "is", "it", "as", "be", "let", "not", "than", "equal",
        "equals", "greater", "less", "more", "at", "least", "most", "otherwise", "unless",
        "every", "loop", "through", "over", "new", "empty", "called", "named", "containing",
        "items", "make", "calculate", "sum", "product", "difference", "split", "divided",
        "multiplied", "store", "save", "put", "into", "variable", "print", "display", "show",
        "say", "increment", "decrement", "update", "change", "append", "delete", "push", "time",
        "true", "false",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_ambiguity_threshold() -> f64 {
    0.7
}
fn default_large_range_threshold() -> u64 {
    10_000
}
fn default_share_symbols() -> bool {
    true
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
            min_words: default_min_words(),
            banned_patterns: default_banned_patterns(),
            scan_stopwords: default_scan_stopwords(),
            ambiguity_threshold: default_ambiguity_threshold(),
            large_range_threshold: default_large_range_threshold(),
            share_symbols_across_statements: default_share_symbols(),
        }
    }
}

impl TranslatorConfig {
    /// Reject contradictory limits.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "max_chars",
                message: "must be greater than zero".into(),
            });
        }
        if self.min_chars > self.max_chars {
            return Err(ConfigError::Invalid {
                field: "min_chars",
                message: format!(
                    "{} exceeds max_chars ({})",
                    self.min_chars, self.max_chars
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.ambiguity_threshold) {
            return Err(ConfigError::Invalid {
                field: "ambiguity_threshold",
                message: format!("{} is outside 0.0..=1.0", self.ambiguity_threshold),
            });
        }
        Ok(())
    }

    /// Compile the banned patterns, case-insensitively.
    pub fn compile_banned(&self) -> ConfigResult<Vec<Regex>> {
        self.banned_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::BadPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect()
    }

    /// Lowercased stopword set for the variable scan.
    pub fn stopword_set(&self) -> BTreeSet<String> {
        self.scan_stopwords
            .iter()
            .map(|w| w.trim().to_ascii_lowercase())
            .filter(|w| !w.is_empty())
            .collect()
    }
}

// ── Sandbox ────────────────────────────────────────────────────────────

/// Settings for the execution sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Interpreter executable, looked up on `PATH` when not absolute.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Wall-clock limit for one run.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Cap on captured stdout and stderr, each.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

/// Longest accepted sandbox run.
pub const MAX_TIMEOUT_SECS: f64 = 24.0 * 60.0 * 60.0;

fn default_interpreter() -> String {
    "python3".into()
}
fn default_timeout_secs() -> f64 {
    30.0
}
fn default_max_output_bytes() -> usize {
    64 * 1024
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            timeout_secs: default_timeout_secs(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

impl SandboxConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.interpreter.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "interpreter",
                message: "must not be empty".into(),
            });
        }
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                message: format!("{} is not a positive number of seconds", self.timeout_secs),
            });
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                message: format!(
                    "{} exceeds the limit of {MAX_TIMEOUT_SECS} seconds",
                    self.timeout_secs
                ),
            });
        }
        Ok(())
    }

    /// The run limit, clamped to `[0, MAX_TIMEOUT_SECS]` for configs that
    /// skipped [`SandboxConfig::validate`].
    pub fn timeout(&self) -> Duration {
        if self.timeout_secs.is_nan() || self.timeout_secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.timeout_secs.min(MAX_TIMEOUT_SECS))
    }
}

// ── File ───────────────────────────────────────────────────────────────

/// Top-level config file: `[translator]` and `[sandbox]` tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl Config {
    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.translator.validate()?;
        self.translator.compile_banned()?;
        self.sandbox.validate()
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = TranslatorConfig::default();
        assert_eq!(c.min_chars, 3);
        assert_eq!(c.max_chars, 1000);
        assert_eq!(c.min_words, 2);
        assert_eq!(c.ambiguity_threshold, 0.7);
        assert_eq!(c.large_range_threshold, 10_000);
        assert!(c.share_symbols_across_statements);
        assert_eq!(SandboxConfig::default().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn default_banned_patterns_compile() {
        let banned = TranslatorConfig::default().compile_banned().unwrap();
        assert_eq!(banned.len(), 5);
        assert!(banned.iter().any(|r| r.is_match("please EVAL this")));
        assert!(banned.iter().any(|r| r.is_match("call __init__ now")));
        assert!(!banned.iter().any(|r| r.is_match("evaluate the score")));
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let c = Config::from_toml("[translator]\nmax_chars = 50\n[sandbox]\ntimeout_secs = 2.5\n")
            .unwrap();
        assert_eq!(c.translator.max_chars, 50);
        assert_eq!(c.translator.min_chars, 3);
        assert_eq!(c.sandbox.timeout(), Duration::from_millis(2500));
        assert_eq!(c.sandbox.interpreter, "python3");
    }

    #[test]
    fn bad_regex_is_rejected() {
        let err = Config::from_toml("[translator]\nbanned_patterns = [\"(\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::BadPattern { .. }));
    }

    #[test]
    fn contradictory_limits_are_rejected() {
        let err =
            Config::from_toml("[translator]\nmin_chars = 10\nmax_chars = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "min_chars", .. }));
        let err = Config::from_toml("[sandbox]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn oversized_timeout_is_rejected() {
        let err = Config::from_toml("[sandbox]\ntimeout_secs = 1e30\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "timeout_secs", .. }));
        assert!(Config::from_toml("[sandbox]\ntimeout_secs = 86400.0\n").is_ok());

        let unchecked = SandboxConfig {
            timeout_secs: 1e30,
            ..Default::default()
        };
        assert_eq!(unchecked.timeout(), Duration::from_secs(86_400));
        let negative = SandboxConfig {
            timeout_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(negative.timeout(), Duration::ZERO);
    }

    #[test]
    fn stopwords_are_lowercased() {
        let c = TranslatorConfig {
            scan_stopwords: vec!["Foo".into(), "  ".into()],
            ..Default::default()
        };
        let set = c.stopword_set();
        assert!(set.contains("foo"));
        assert_eq!(set.len(), 1);
    }
}
