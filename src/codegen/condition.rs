//! Rewriting an English condition clause into a Python boolean expression.
//!
//! Rewriting is literal substitution over the text outside quotes. Longer
//! phrases are rewritten before their prefixes, so `greater than or equal
//! to` becomes `>=` rather than `> or equal to`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        regex: Regex::new(&format!(r"(?i){pattern}")).unwrap(),
        replacement,
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"\s+(?:is\s+)?greater\s+than\s+or\s+equal\s+to\s+", " >= "),
        rule(r"\s+(?:is\s+)?less\s+than\s+or\s+equal\s+to\s+", " <= "),
        rule(
            r"\s+(?:(?:is\s+)?not\s+equal\s+to|does\s+not\s+equal|is\s+not\s+equals?)\s+",
            " != ",
        ),
        rule(r"\s+(?:is\s+)?(?:greater|more|bigger|larger)\s+than\s+", " > "),
        rule(r"\s+(?:is\s+)?(?:less|fewer|smaller)\s+than\s+", " < "),
        rule(r"\s+(?:is\s+)?at\s+least\s+", " >= "),
        rule(r"\s+(?:is\s+)?at\s+most\s+", " <= "),
        rule(r"\s+(?:(?:is\s+)?equal\s+to|equals)\s+", " == "),
        rule(r"\s+is\s+not\s+in\s+", " not in "),
        rule(r"\s+is\s+in\s+", " in "),
        rule(r"\s+is\s+not\s+", " != "),
        rule(r"\s+is\s+", " == "),
    ]
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static LONE_EQUALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^=!<>])=([^=]|$)").unwrap());
static KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:true|false|none|null|and|or|not)\b").unwrap());

/// Python expression for a condition clause.
pub fn rewrite_condition(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    let collapsed = collapsed.trim_end_matches(['.', ',', ';', ':']);
    map_unquoted(collapsed, rewrite_segment).trim().to_string()
}

fn rewrite_segment(segment: &str) -> String {
    let mut out = segment.to_string();
    for rule in RULES.iter() {
        out = rule.regex.replace_all(&out, rule.replacement).into_owned();
    }
    out = LONE_EQUALS.replace_all(&out, "${1}==${2}").into_owned();
    KEYWORDS
        .replace_all(&out, |caps: &Captures| {
            match caps[0].to_ascii_lowercase().as_str() {
                "true" => "True".to_string(),
                "false" => "False".to_string(),
                "none" | "null" => "None".to_string(),
                other => other.to_string(),
            }
        })
        .into_owned()
}

/// Apply `f` to every run of `text` outside `"…"`/`'…'` literals.
fn map_unquoted(text: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut start = 0;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => {
                out.push_str(&text[start..=i]);
                start = i + 1;
                quote = None;
            }
            Some(_) => {}
            None if c == '"' || c == '\'' => {
                out.push_str(&f(&text[start..i]));
                start = i;
                quote = Some(c);
            }
            None => {}
        }
    }
    match quote {
        Some(_) => out.push_str(&text[start..]),
        None => out.push_str(&f(&text[start..])),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_comparisons() {
        assert_eq!(rewrite_condition("x greater than 5"), "x > 5");
        assert_eq!(rewrite_condition("temperature less than 32"), "temperature < 32");
        assert_eq!(rewrite_condition("count equals 0"), "count == 0");
        assert_eq!(rewrite_condition("count is equal to 0"), "count == 0");
        assert_eq!(rewrite_condition("status is done"), "status == done");
    }

    #[test]
    fn longer_phrases_win() {
        assert_eq!(rewrite_condition("x is greater than or equal to 10"), "x >= 10");
        assert_eq!(rewrite_condition("x less than or equal to 10"), "x <= 10");
        assert_eq!(rewrite_condition("x is not equal to y"), "x != y");
        assert_eq!(rewrite_condition("x does not equal y"), "x != y");
        assert_eq!(rewrite_condition("x is not 3"), "x != 3");
        assert_eq!(rewrite_condition("age at least 18"), "age >= 18");
        assert_eq!(rewrite_condition("age is at most 65"), "age <= 65");
    }

    #[test]
    fn membership() {
        assert_eq!(rewrite_condition("x is in items"), "x in items");
        assert_eq!(rewrite_condition("x is not in items"), "x not in items");
    }

    #[test]
    fn connectives_and_literals() {
        assert_eq!(
            rewrite_condition("x greater than 5 AND done is TRUE"),
            "x > 5 and done == True"
        );
        assert_eq!(rewrite_condition("flag is not none"), "flag != None");
    }

    #[test]
    fn symbolic_forms() {
        assert_eq!(rewrite_condition("x = 5"), "x == 5");
        assert_eq!(rewrite_condition("x >= 5"), "x >= 5");
        assert_eq!(rewrite_condition("x != 5"), "x != 5");
        assert_eq!(rewrite_condition("x == 5"), "x == 5");
    }

    #[test]
    fn quoted_text_is_untouched() {
        assert_eq!(
            rewrite_condition("name equals \"is greater than\""),
            "name == \"is greater than\""
        );
    }

    #[test]
    fn whitespace_collapsed() {
        assert_eq!(rewrite_condition("  x   greater  than   5 , "), "x > 5");
    }
}
