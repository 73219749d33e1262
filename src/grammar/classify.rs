//! Sentence classification across categories.

use tracing::debug;

use super::catalog::Category;
use super::matcher::{PatternMatch, match_category};

/// Outcome of classifying one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// The winning match, `None` when the category is [`Category::Unknown`].
    pub matched: Option<PatternMatch>,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            category: Category::Unknown,
            matched: None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.category != Category::Unknown
    }
}

/// Classify `text` by trying categories in [`Category::CLASSIFICATION_ORDER`].
pub fn classify(text: &str) -> Classification {
    for category in Category::CLASSIFICATION_ORDER {
        if let Some(matched) = match_category(text, category) {
            debug!(
                category = %category,
                tag = %matched.tag,
                priority = matched.priority,
                "classified sentence"
            );
            return Classification {
                category,
                matched: Some(matched),
            };
        }
    }
    debug!(text, "no pattern matched");
    Classification::unknown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::catalog::Tag;

    fn category(text: &str) -> Category {
        classify(text).category
    }

    #[test]
    fn each_category() {
        assert_eq!(category("add 5 and 3"), Category::Arithmetic);
        assert_eq!(category("set x to 10"), Category::Assignment);
        assert_eq!(category("if x greater than 5 then print yes"), Category::Conditional);
        assert_eq!(category("repeat 5 times print hello"), Category::Loop);
        assert_eq!(category("create list with 1, 2, 3"), Category::DataOperation);
        assert_eq!(category("hello world"), Category::Unknown);
    }

    #[test]
    fn conditional_beats_embedded_assignment() {
        let c = classify("if x equals 1 then set y to 2");
        assert_eq!(c.category, Category::Conditional);
    }

    #[test]
    fn loop_beats_embedded_arithmetic() {
        assert_eq!(category("repeat 3 times add 1 to count"), Category::Loop);
    }

    #[test]
    fn data_beats_arithmetic_for_add_to() {
        let c = classify("add 4 to numbers");
        assert_eq!(c.category, Category::DataOperation);
        assert_eq!(c.matched.unwrap().tag, Tag::AppendList);
    }

    #[test]
    fn create_variable_is_assignment() {
        let c = classify("create variable name with value hello");
        assert_eq!(c.category, Category::Assignment);
    }

    #[test]
    fn assignment_with_operator_falls_through_to_arithmetic() {
        assert_eq!(category("total = price * 2"), Category::Arithmetic);
        assert_eq!(category("total = 5"), Category::Assignment);
    }

    #[test]
    fn while_with_comparator_body() {
        let c = classify("while x less than 10 increment x");
        let m = c.matched.unwrap();
        assert_eq!(m.tag, Tag::While);
        assert_eq!(m.group(0), Some("x less than 10"));
        assert_eq!(m.group(1), Some("increment x"));
    }

    #[test]
    fn unknown_has_no_match() {
        let c = classify("the quick brown fox");
        assert!(!c.is_known());
        assert!(c.matched.is_none());
    }
}
