//! The ordered pattern catalog.
//!
//! Each category owns a list of `(priority, regex, tag)` entries. Lower
//! priority numbers are tried first and the first match wins, so the order
//! of entries is business logic: worded division comes before anything that
//! could read `by` as multiplication, symbolic operators are last-resort
//! fallbacks, `create` precedes `append`/`remove`, and `if … then` precedes
//! `when … do`. The priorities are explicit so a test can pin the ordering.

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// The kind of instruction a sentence expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Arithmetic,
    Assignment,
    Conditional,
    Loop,
    DataOperation,
    Unknown,
}

impl Category {
    /// Order in which the classifier tries categories. Looser surface
    /// patterns (bare `a = b`, bare `a + b`) come last so they cannot shadow
    /// multi-keyword constructs.
    pub const CLASSIFICATION_ORDER: [Category; 5] = [
        Category::Conditional,
        Category::Loop,
        Category::DataOperation,
        Category::Assignment,
        Category::Arithmetic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arithmetic => "arithmetic",
            Self::Assignment => "assignment",
            Self::Conditional => "conditional",
            Self::Loop => "loop",
            Self::DataOperation => "data_operation",
            Self::Unknown => "unknown",
        }
    }

    /// Heading used when listing examples to the user.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Arithmetic => "Arithmetic Operations",
            Self::Assignment => "Variable Assignment",
            Self::Conditional => "Conditional Statements",
            Self::Loop => "Loop Operations",
            Self::DataOperation => "Data Operations",
            Self::Unknown => "Unknown",
        }
    }

    /// Compiled patterns for this category, in priority order.
    pub fn patterns(self) -> &'static [Pattern] {
        match self {
            Self::Arithmetic => ARITHMETIC.as_slice(),
            Self::Assignment => ASSIGNMENT.as_slice(),
            Self::Conditional => CONDITIONAL.as_slice(),
            Self::Loop => LOOP.as_slice(),
            Self::DataOperation => DATA_OPERATION.as_slice(),
            Self::Unknown => &[],
        }
    }

    /// Uncompiled pattern table for this category.
    pub fn specs(self) -> &'static [PatternSpec] {
        match self {
            Self::Arithmetic => ARITHMETIC_SPECS,
            Self::Assignment => ASSIGNMENT_SPECS,
            Self::Conditional => CONDITIONAL_SPECS,
            Self::Loop => LOOP_SPECS,
            Self::DataOperation => DATA_OPERATION_SPECS,
            Self::Unknown => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic tag selecting the extraction and synthesis branch for a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Add,
    Subtract,
    /// `subtract A from B`: operands arrive reversed.
    SubtractFrom,
    Multiply,
    Divide,
    Assign,
    /// `assign V to X`: value before name.
    AssignTo,
    IfThen,
    IfComma,
    WhenDo,
    Unless,
    Repeat,
    ForEach,
    LoopThrough,
    While,
    CreateList,
    CreateDict,
    AppendList,
    RemoveList,
    GetItem,
    UpdateItem,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::SubtractFrom => "subtract_from",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Assign => "assign",
            Self::AssignTo => "assign_to",
            Self::IfThen => "if_then",
            Self::IfComma => "if_comma",
            Self::WhenDo => "when_do",
            Self::Unless => "unless",
            Self::Repeat => "repeat",
            Self::ForEach => "for_each",
            Self::LoopThrough => "loop_through",
            Self::While => "while",
            Self::CreateList => "create_list",
            Self::CreateDict => "create_dict",
            Self::AppendList => "append_list",
            Self::RemoveList => "remove_list",
            Self::GetItem => "get_item",
            Self::UpdateItem => "update_item",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uncompiled catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct PatternSpec {
    pub priority: u16,
    pub source: &'static str,
    pub tag: Tag,
}

/// A compiled catalog entry.
#[derive(Debug)]
pub struct Pattern {
    pub priority: u16,
    pub tag: Tag,
    pub regex: Regex,
}

// A number (optionally signed, optionally decimal) or an identifier.
macro_rules! operand {
    () => {
        r"(-?\d+(?:\.\d+)?\b|[A-Za-z_]\w*)"
    };
}

// Optional trailing `else`/`otherwise` clause shared by conditional forms.
macro_rules! else_clause {
    () => {
        r"(?:\s*[,;]?\s+(?:else|otherwise)\s*[,:]?\s+(.+?))?\s*$"
    };
}

// Optional `called NAME` followed by optional item list, shared by create forms.
macro_rules! collection_tail {
    () => {
        r"(?:\s+(?:called|named)\s+([A-Za-z_]\w*))?(?:\s*(?::|\bwith\b|\bof\b|\bcontaining\b)\s*(?:(?:items?|values?|numbers?|elements?)\b\s*)?:?\s*(.+?))?\s*$"
    };
}

const ARITHMETIC_SPECS: &[PatternSpec] = &[
    PatternSpec {
        priority: 10,
        source: concat!(r"\bdivide\s+", operand!(), r"\s+(?:by|with)\s+", operand!()),
        tag: Tag::Divide,
    },
    PatternSpec {
        priority: 20,
        source: concat!(operand!(), r"\s+divided\s+by\s+", operand!()),
        tag: Tag::Divide,
    },
    PatternSpec {
        priority: 30,
        source: concat!(r"\bsplit\s+", operand!(), r"\s+(?:by|with|/)\s+", operand!()),
        tag: Tag::Divide,
    },
    PatternSpec {
        priority: 40,
        source: concat!(
            r"\b(?:add|plus|sum)\s+",
            operand!(),
            r"\s+(?:and|with|plus|\+)\s+",
            operand!()
        ),
        tag: Tag::Add,
    },
    PatternSpec {
        priority: 50,
        source: concat!(r"\bsum\s+of\s+", operand!(), r"\s+and\s+", operand!()),
        tag: Tag::Add,
    },
    PatternSpec {
        priority: 60,
        source: concat!(operand!(), r"\s+plus\s+", operand!()),
        tag: Tag::Add,
    },
    PatternSpec {
        priority: 70,
        source: concat!(r"\bsubtract\s+", operand!(), r"\s+from\s+", operand!()),
        tag: Tag::SubtractFrom,
    },
    PatternSpec {
        priority: 80,
        source: concat!(
            r"\b(?:subtract|minus)\s+",
            operand!(),
            r"\s+(?:and|with|by)\s+",
            operand!()
        ),
        tag: Tag::Subtract,
    },
    PatternSpec {
        priority: 90,
        source: concat!(
            r"\bdifference\s+(?:of|between)\s+",
            operand!(),
            r"\s+and\s+",
            operand!()
        ),
        tag: Tag::Subtract,
    },
    PatternSpec {
        priority: 100,
        source: concat!(operand!(), r"\s+minus\s+", operand!()),
        tag: Tag::Subtract,
    },
    PatternSpec {
        priority: 110,
        source: concat!(
            r"\bmultiply\s+",
            operand!(),
            r"\s+(?:by|and|with|times)\s+",
            operand!()
        ),
        tag: Tag::Multiply,
    },
    PatternSpec {
        priority: 120,
        source: concat!(operand!(), r"\s+multiplied\s+by\s+", operand!()),
        tag: Tag::Multiply,
    },
    PatternSpec {
        priority: 130,
        source: concat!(operand!(), r"\s+times\s+", operand!()),
        tag: Tag::Multiply,
    },
    PatternSpec {
        priority: 140,
        source: concat!(r"\bproduct\s+of\s+", operand!(), r"\s+and\s+", operand!()),
        tag: Tag::Multiply,
    },
    // Symbolic fallbacks.
    PatternSpec {
        priority: 200,
        source: concat!(operand!(), r"\s*/\s*", operand!()),
        tag: Tag::Divide,
    },
    PatternSpec {
        priority: 210,
        source: concat!(operand!(), r"\s*\*\s*", operand!()),
        tag: Tag::Multiply,
    },
    PatternSpec {
        priority: 220,
        source: concat!(operand!(), r"\s*\+\s*", operand!()),
        tag: Tag::Add,
    },
    PatternSpec {
        priority: 230,
        source: concat!(operand!(), r"\s*-\s*", operand!()),
        tag: Tag::Subtract,
    },
];

const ASSIGNMENT_SPECS: &[PatternSpec] = &[
    PatternSpec {
        priority: 10,
        source: r"\bset\s+(?:the\s+)?(?:variable\s+)?([A-Za-z_]\w*)\s+(?:to|=|as)\s+(.+?)\s*$",
        tag: Tag::Assign,
    },
    PatternSpec {
        priority: 20,
        source: r"\bcreate\s+(?:a\s+)?(?:new\s+)?variable\s+(?:called\s+|named\s+)?([A-Za-z_]\w*)\s+(?:with\s+(?:the\s+)?value\s+|equal\s+to\s+|=\s*)(.+?)\s*$",
        tag: Tag::Assign,
    },
    PatternSpec {
        priority: 30,
        source: r"\bassign\s+(.+?)\s+to\s+([A-Za-z_]\w*)\s*$",
        tag: Tag::AssignTo,
    },
    PatternSpec {
        priority: 40,
        source: r"\blet\s+([A-Za-z_]\w*)\s+(?:be|equal|=)\s+(.+?)\s*$",
        tag: Tag::Assign,
    },
    PatternSpec {
        priority: 50,
        source: r"\b([A-Za-z_]\w*)\s*=\s*(-?[^+\-*/=<>!\s][^+\-*/=<>!]*?)\s*$",
        tag: Tag::Assign,
    },
];

const CONDITIONAL_SPECS: &[PatternSpec] = &[
    PatternSpec {
        priority: 10,
        source: concat!(r"\bif\s+(.+?)\s*,?\s+then\s+(.+?)", else_clause!()),
        tag: Tag::IfThen,
    },
    PatternSpec {
        priority: 20,
        source: concat!(r"\bif\s+(.+?)\s*[,:]\s*(.+?)", else_clause!()),
        tag: Tag::IfComma,
    },
    PatternSpec {
        priority: 30,
        source: concat!(r"\bwhen\s+(.+?)\s*,?\s+(?:then|do)\s+(.+?)", else_clause!()),
        tag: Tag::WhenDo,
    },
    PatternSpec {
        priority: 40,
        source: concat!(r"\bwhen\s+(.+?)\s*[,:]\s*(.+?)", else_clause!()),
        tag: Tag::WhenDo,
    },
    PatternSpec {
        priority: 50,
        source: concat!(
            r"\bunless\s+(.+?)\s*(?:,|:|\s+then|\s+do)\s+(.+?)",
            else_clause!()
        ),
        tag: Tag::Unless,
    },
];

const LOOP_SPECS: &[PatternSpec] = &[
    PatternSpec {
        priority: 10,
        source: r"\brepeat\s+(\d+)\s+times?\b\s*[:,]?\s*(.*?)\s*$",
        tag: Tag::Repeat,
    },
    PatternSpec {
        priority: 20,
        source: r"\bfor\s+(?:(?:each|every)\s+)?([A-Za-z_]\w*)\s+in\s+([A-Za-z_]\w*)\b\s*[:,]?\s*(.*?)\s*$",
        tag: Tag::ForEach,
    },
    PatternSpec {
        priority: 30,
        source: r"\b(?:loop|iterate|go)\s+(?:through|over)\s+(?:the\s+)?([A-Za-z_]\w*)\b\s*[:,]?\s*(.*?)\s*$",
        tag: Tag::LoopThrough,
    },
    PatternSpec {
        priority: 40,
        source: r"\bwhile\s+(.+?)\s*(?:[:,]|\s+do\b)\s*(.*?)\s*$",
        tag: Tag::While,
    },
    PatternSpec {
        priority: 50,
        source: r"\bwhile\s+([A-Za-z_]\w*\s+(?:is\s+)?(?:greater\s+than(?:\s+or\s+equal\s+to)?|less\s+than(?:\s+or\s+equal\s+to)?|more\s+than|fewer\s+than|not\s+equal\s+to|equal\s+to|equals|at\s+least|at\s+most|is\s+not|is|==|!=|<=|>=|<|>)\s+-?[\w.]+)(?:\s+(.+?))?\s*$",
        tag: Tag::While,
    },
    PatternSpec {
        priority: 60,
        source: r"\bwhile\s+(.+?)\s*$",
        tag: Tag::While,
    },
];

const DATA_OPERATION_SPECS: &[PatternSpec] = &[
    PatternSpec {
        priority: 10,
        source: concat!(
            r"\b(?:create|make|build)\s+(?:a\s+|an\s+)?(?:new\s+)?(?:empty\s+)?list\b",
            collection_tail!()
        ),
        tag: Tag::CreateList,
    },
    PatternSpec {
        priority: 20,
        source: concat!(r"\bnew\s+(?:empty\s+)?list\b", collection_tail!()),
        tag: Tag::CreateList,
    },
    PatternSpec {
        priority: 30,
        source: concat!(
            r"\b(?:create|make|build)\s+(?:a\s+|an\s+)?(?:new\s+)?(?:empty\s+)?(?:dictionary|dict|map)\b",
            collection_tail!()
        ),
        tag: Tag::CreateDict,
    },
    PatternSpec {
        priority: 40,
        source: concat!(
            r"\bnew\s+(?:empty\s+)?(?:dictionary|dict|map)\b",
            collection_tail!()
        ),
        tag: Tag::CreateDict,
    },
    PatternSpec {
        priority: 50,
        source: r"\b(?:add|append|push|insert)\s+(.+?)\s+(?:to|into|onto)\s+(?:the\s+)?(?:list\s+)?([A-Za-z_]\w*)\s*$",
        tag: Tag::AppendList,
    },
    PatternSpec {
        priority: 60,
        source: r"\b(?:remove|delete)\s+(.+?)\s+from\s+(?:the\s+)?(?:list\s+)?([A-Za-z_]\w*)\s*$",
        tag: Tag::RemoveList,
    },
    PatternSpec {
        priority: 70,
        source: r"\b(?:get|fetch|retrieve)\s+(?:the\s+)?(?:(?:item|element|entry)\s+|value\s+(?:of\s+|at\s+)?)?(.+?)\s+(?:from|of|in)\s+(?:the\s+)?(?:list\s+|dict(?:ionary)?\s+)?([A-Za-z_]\w*)\s*$",
        tag: Tag::GetItem,
    },
    PatternSpec {
        priority: 80,
        source: r"\b(?:update|change)\s+(.+?)\s+in\s+(?:the\s+)?(?:list\s+|dict(?:ionary)?\s+)?([A-Za-z_]\w*)\s+to\s+(.+?)\s*$",
        tag: Tag::UpdateItem,
    },
];

fn compile(specs: &[PatternSpec]) -> Vec<Pattern> {
    specs
        .iter()
        .map(|spec| Pattern {
            priority: spec.priority,
            tag: spec.tag,
            regex: RegexBuilder::new(spec.source)
                .case_insensitive(true)
                .dot_matches_new_line(true)
                .build()
                .unwrap(),
        })
        .collect()
}

static ARITHMETIC: LazyLock<Vec<Pattern>> = LazyLock::new(|| compile(ARITHMETIC_SPECS));
static ASSIGNMENT: LazyLock<Vec<Pattern>> = LazyLock::new(|| compile(ASSIGNMENT_SPECS));
static CONDITIONAL: LazyLock<Vec<Pattern>> = LazyLock::new(|| compile(CONDITIONAL_SPECS));
static LOOP: LazyLock<Vec<Pattern>> = LazyLock::new(|| compile(LOOP_SPECS));
static DATA_OPERATION: LazyLock<Vec<Pattern>> = LazyLock::new(|| compile(DATA_OPERATION_SPECS));

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Category; 5] = Category::CLASSIFICATION_ORDER;

    #[test]
    fn every_pattern_compiles() {
        for category in ALL {
            assert_eq!(category.patterns().len(), category.specs().len());
        }
    }

    #[test]
    fn priorities_strictly_increase() {
        for category in ALL {
            let specs = category.specs();
            for pair in specs.windows(2) {
                assert!(
                    pair[0].priority < pair[1].priority,
                    "{category}: {} then {}",
                    pair[0].priority,
                    pair[1].priority
                );
            }
        }
    }

    #[test]
    fn worded_division_precedes_multiplication() {
        let specs = Category::Arithmetic.specs();
        let last_worded_divide = specs
            .iter()
            .filter(|s| s.tag == Tag::Divide && s.priority < 200)
            .map(|s| s.priority)
            .max()
            .unwrap();
        let first_multiply = specs
            .iter()
            .filter(|s| s.tag == Tag::Multiply)
            .map(|s| s.priority)
            .min()
            .unwrap();
        assert!(last_worded_divide < first_multiply);
    }

    #[test]
    fn symbolic_fallbacks_come_last() {
        let is_symbolic = |s: &PatternSpec| {
            [r"\s*/\s*", r"\s*\*\s*", r"\s*\+\s*", r"\s*-\s*"]
                .iter()
                .any(|op| s.source.contains(op))
        };
        let specs = Category::Arithmetic.specs();
        let first_symbolic = specs.iter().filter(|s| is_symbolic(s)).map(|s| s.priority).min().unwrap();
        let last_worded = specs.iter().filter(|s| !is_symbolic(s)).map(|s| s.priority).max().unwrap();
        assert!(last_worded < first_symbolic);
    }

    #[test]
    fn create_precedes_append_and_remove() {
        let specs = Category::DataOperation.specs();
        let max_create = specs
            .iter()
            .filter(|s| matches!(s.tag, Tag::CreateList | Tag::CreateDict))
            .map(|s| s.priority)
            .max()
            .unwrap();
        assert!(
            specs
                .iter()
                .filter(|s| matches!(s.tag, Tag::AppendList | Tag::RemoveList))
                .all(|s| s.priority > max_create)
        );
    }

    #[test]
    fn if_then_precedes_when_do() {
        let specs = Category::Conditional.specs();
        let if_then = specs.iter().find(|s| s.tag == Tag::IfThen).unwrap();
        let when_do = specs.iter().find(|s| s.tag == Tag::WhenDo).unwrap();
        assert!(if_then.priority < when_do.priority);
    }

    #[test]
    fn display_names() {
        assert_eq!(Category::DataOperation.display_name(), "Data Operations");
        assert_eq!(Category::Loop.to_string(), "loop");
    }
}
