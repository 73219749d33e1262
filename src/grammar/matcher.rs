//! First-match-wins lookup over one category's pattern list.

use super::catalog::{Category, Tag};

/// A successful match: which entry fired and what it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub category: Category,
    pub tag: Tag,
    pub priority: u16,
    /// Capture groups 1..n. Optional clauses that did not participate are `None`.
    pub groups: Vec<Option<String>>,
}

impl PatternMatch {
    /// A capture group, trimmed, with empty captures treated as absent.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups
            .get(index)
            .and_then(|g| g.as_deref())
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

/// Try each pattern of `category` in priority order; return the first match.
pub fn match_category(text: &str, category: Category) -> Option<PatternMatch> {
    category.patterns().iter().find_map(|pattern| {
        let captures = pattern.regex.captures(text)?;
        let groups = captures
            .iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        Some(PatternMatch {
            category,
            tag: pattern.tag,
            priority: pattern.priority,
            groups,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic(text: &str) -> PatternMatch {
        match_category(text, Category::Arithmetic).unwrap()
    }

    #[test]
    fn worded_arithmetic() {
        let m = arithmetic("add 5 and 3");
        assert_eq!(m.tag, Tag::Add);
        assert_eq!(m.group(0), Some("5"));
        assert_eq!(m.group(1), Some("3"));

        assert_eq!(arithmetic("multiply x by 2").tag, Tag::Multiply);
        assert_eq!(arithmetic("subtract 3 from 8").tag, Tag::SubtractFrom);
        assert_eq!(arithmetic("what is 7 minus 2").tag, Tag::Subtract);
    }

    #[test]
    fn division_by_phrase_is_not_multiplication() {
        let m = arithmetic("divide 10 by 2");
        assert_eq!(m.tag, Tag::Divide);
        assert_eq!(m.group(0), Some("10"));
        assert_eq!(m.group(1), Some("2"));
        assert_eq!(arithmetic("calculate 9 divided by 3").tag, Tag::Divide);
    }

    #[test]
    fn symbolic_fallbacks() {
        assert_eq!(arithmetic("10 / 2").tag, Tag::Divide);
        assert_eq!(arithmetic("4 * 2").tag, Tag::Multiply);
        assert_eq!(arithmetic("a + b").tag, Tag::Add);
        assert_eq!(arithmetic("9 - 4").tag, Tag::Subtract);
        assert_eq!(arithmetic("2.5 * 4").group(0), Some("2.5"));
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(arithmetic("ADD 1 AND 2").tag, Tag::Add);
    }

    #[test]
    fn optional_else_group_is_absent() {
        let m = match_category("if x greater than 5 then print yes", Category::Conditional)
            .unwrap();
        assert_eq!(m.tag, Tag::IfThen);
        assert_eq!(m.group(0), Some("x greater than 5"));
        assert_eq!(m.group(1), Some("print yes"));
        assert_eq!(m.group(2), None);
    }

    #[test]
    fn else_group_is_captured() {
        let m = match_category(
            "if score greater than 80 then print excellent else print good",
            Category::Conditional,
        )
        .unwrap();
        assert_eq!(m.group(1), Some("print excellent"));
        assert_eq!(m.group(2), Some("print good"));
    }

    #[test]
    fn captures_span_newlines() {
        let m = match_category("if x greater than 5 then\nprint yes", Category::Conditional)
            .unwrap();
        assert_eq!(m.group(1), Some("print yes"));
    }

    #[test]
    fn no_match() {
        assert!(match_category("hello world", Category::Arithmetic).is_none());
        assert!(match_category("hello world", Category::Unknown).is_none());
    }
}
