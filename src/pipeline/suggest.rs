//! The supported-patterns catalog and the example text built from it.
//!
//! The catalog is read-only documentation of what the grammar accepts. It
//! is never consulted for matching; a test keeps every example translatable.

use serde::Serialize;

use crate::grammar::Category;

/// One category and example instructions for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternGroup {
    pub category: Category,
    pub examples: &'static [&'static str],
    /// Words that make this category relevant to a failed input.
    #[serde(skip)]
    pub keywords: &'static [&'static str],
}

impl PatternGroup {
    pub fn name(&self) -> &'static str {
        self.category.display_name()
    }
}

pub const SUPPORTED_PATTERNS: &[PatternGroup] = &[
    PatternGroup {
        category: Category::Arithmetic,
        examples: &[
            "add 5 and 3",
            "multiply x by 2",
            "divide 10 by 2",
            "subtract 3 from 8",
        ],
        keywords: &[
            "add", "plus", "sum", "multiply", "times", "divide", "subtract", "minus", "calculate",
        ],
    },
    PatternGroup {
        category: Category::Assignment,
        examples: &[
            "set x to 10",
            "create variable name with value hello",
            "assign 42 to answer",
        ],
        keywords: &["set", "create", "assign", "variable", "value"],
    },
    PatternGroup {
        category: Category::Conditional,
        examples: &[
            "if x greater than 5 then print yes",
            "when count equals 0 do print empty",
            "if temperature less than 32 then print freezing else print not freezing",
        ],
        keywords: &["if", "when", "then", "else", "condition"],
    },
    PatternGroup {
        category: Category::DataOperation,
        examples: &[
            "create list with 1, 2, 3",
            "add item to my_list",
            "create dictionary with name John and age 25",
        ],
        keywords: &["list", "array", "dictionary", "dict", "data"],
    },
    PatternGroup {
        category: Category::Loop,
        examples: &[
            "repeat 5 times print hello",
            "for each item in numbers print item",
            "while x less than 10 increment x",
        ],
        keywords: &["repeat", "loop", "for", "while", "each", "times"],
    },
];

/// Groups whose keywords appear as words in `text`; every group when none do.
pub fn relevant_groups(text: &str) -> Vec<&'static PatternGroup> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    let relevant: Vec<_> = SUPPORTED_PATTERNS
        .iter()
        .filter(|group| {
            group
                .keywords
                .iter()
                .any(|k| words.iter().any(|w| w == k))
        })
        .collect();
    if relevant.is_empty() {
        SUPPORTED_PATTERNS.iter().collect()
    } else {
        relevant
    }
}

/// `\n\nExamples:` followed by the first example of each category.
pub fn short_examples() -> String {
    let mut out = String::from("\n\nExamples:");
    for group in SUPPORTED_PATTERNS {
        if let Some(example) = group.examples.first() {
            out.push_str(&format!("\n  • {example}"));
        }
    }
    out
}

/// Suggestions appended to an unrecognised-input message: two examples
/// from each category relevant to `text`.
pub fn unrecognized_suggestions(text: &str) -> String {
    let mut out = String::from("\n\nSupported patterns and examples:");
    for group in relevant_groups(text) {
        out.push_str(&format!("\n\n{}:", group.name()));
        for example in group.examples.iter().take(2) {
            out.push_str(&format!("\n  • {example}"));
        }
    }
    out
}

/// The whole catalog, for display.
pub fn render_catalog() -> String {
    let mut out = String::new();
    for (i, group) in SUPPORTED_PATTERNS.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{}:\n", group.name()));
        for example in group.examples {
            out.push_str(&format!("  • {example}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_category_once() {
        let mut categories: Vec<_> = SUPPORTED_PATTERNS.iter().map(|g| g.category).collect();
        categories.sort();
        categories.dedup();
        assert_eq!(categories.len(), Category::CLASSIFICATION_ORDER.len());
    }

    #[test]
    fn keyword_filtering() {
        let groups = relevant_groups("if it rains");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, Category::Conditional);

        let groups = relevant_groups("LOOP over stuff");
        assert_eq!(groups[0].category, Category::Loop);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "iffy" and "settle" must not select conditional or assignment.
        assert_eq!(relevant_groups("iffy settle").len(), SUPPORTED_PATTERNS.len());
    }

    #[test]
    fn unrecognized_text_layout() {
        let text = unrecognized_suggestions("if it rains");
        assert_eq!(
            text,
            "\n\nSupported patterns and examples:\n\nConditional Statements:\
             \n  • if x greater than 5 then print yes\
             \n  • when count equals 0 do print empty"
        );
    }

    #[test]
    fn short_examples_has_one_per_category() {
        let text = short_examples();
        assert!(text.starts_with("\n\nExamples:"));
        assert_eq!(text.matches('•').count(), SUPPORTED_PATTERNS.len());
    }

    #[test]
    fn catalog_rendering() {
        let text = render_catalog();
        assert!(text.starts_with("Arithmetic Operations:\n  • add 5 and 3\n"));
        assert!(text.contains("Loop Operations:"));
    }
}
