//! Pre-validation: checks that run before any pattern matching.

use regex::Regex;

use crate::config::TranslatorConfig;
use crate::error::{TranslateError, TranslateResult};

use super::suggest::short_examples;

/// Check `text` against the configured limits and banned content.
///
/// Rules run in a fixed order: empty, too short, too long, banned content,
/// too few words. The first violated rule is reported.
pub fn validate(text: &str, config: &TranslatorConfig, banned: &[Regex]) -> TranslateResult<()> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TranslateError::Empty {
            examples: short_examples(),
        });
    }
    if trimmed.chars().count() < config.min_chars {
        return Err(TranslateError::TooShort {
            examples: short_examples(),
        });
    }
    let length = text.chars().count();
    if length > config.max_chars {
        return Err(TranslateError::TooLong {
            length,
            max: config.max_chars,
            examples: short_examples(),
        });
    }
    if let Some(rule) = banned.iter().find(|rule| rule.is_match(text)) {
        return Err(TranslateError::UnsafeContent {
            pattern: rule.as_str().to_string(),
        });
    }
    if trimmed.split_whitespace().count() < config.min_words {
        return Err(TranslateError::TooShort {
            examples: short_examples(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> TranslateResult<()> {
        let config = TranslatorConfig::default();
        let banned = config.compile_banned().unwrap();
        validate(text, &config, &banned)
    }

    #[test]
    fn boundaries() {
        assert!(matches!(check(""), Err(TranslateError::Empty { .. })));
        assert!(matches!(check("   \n"), Err(TranslateError::Empty { .. })));
        assert!(matches!(check(" ab "), Err(TranslateError::TooShort { .. })));
        assert!(matches!(
            check(&"a ".repeat(500).chars().chain(['b']).collect::<String>()),
            Err(TranslateError::TooLong { length: 1001, .. })
        ));
        assert!(check(&format!("set x to {}", "9".repeat(990))).is_ok());
    }

    #[test]
    fn banned_content() {
        for text in ["import os now", "eval this", "call __init__ please", "open(file) now"] {
            assert!(
                matches!(check(text), Err(TranslateError::UnsafeContent { .. })),
                "{text}"
            );
        }
        assert!(check("evaluate the score").is_ok());
    }

    #[test]
    fn single_word_is_too_short() {
        assert!(matches!(check("hello"), Err(TranslateError::TooShort { .. })));
    }

    #[test]
    fn messages_name_the_rule() {
        let message = check("").unwrap_err().to_string();
        assert!(message.starts_with("Input cannot be empty."));
        assert!(message.contains("add 5 and 3"));
    }
}
