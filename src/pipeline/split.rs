//! Multi-statement splitting.
//!
//! Newlines always separate statements. A single line is additionally cut
//! in front of phrases that start a new instruction (`set X to`, `create`,
//! `add X and`, …), unless the phrase is plainly a clause of the preceding
//! instruction (`… then set y to 1`, `… else create …`).

use std::sync::LazyLock;

use regex::Regex;

static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:set\s+\w+\s+to\s|if\s+\w+\s+\w+\s+than\s|when\s+\w+\s+\w+\s|create\s|add\s+\w+\s+and\s|multiply\s+\w+\s+by\s|subtract\s+\w+\s+from\s|divide\s+\w+\s+by\s)",
    )
    .unwrap()
});

/// Words that bind a following phrase to the instruction before it.
const CONTINUATIONS: &[&str] = &[
    "then", "else", "otherwise", "do", "times", "to", "with", "of", "by", "in", "from", "is",
];

const TRAILING_PUNCTUATION: &[char] = &[',', ';', '.'];

/// Segment `text` into independent instructions, in order.
pub fn split_statements(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    match lines.as_slice() {
        [] => Vec::new(),
        [line] => split_line(line),
        _ => lines.iter().map(|line| clean(line)).collect(),
    }
}

fn split_line(line: &str) -> Vec<String> {
    let cuts: Vec<usize> = BOUNDARY
        .find_iter(line)
        .map(|m| m.start())
        .filter(|&start| is_boundary(line, start))
        .collect();
    if cuts.is_empty() {
        return vec![clean(line)];
    }

    let mut segments = Vec::with_capacity(cuts.len() + 1);
    let mut from = 0;
    for cut in cuts.into_iter().chain([line.len()]) {
        let segment = clean(&line[from..cut]);
        if !segment.is_empty() {
            segments.push(segment);
        }
        from = cut;
    }
    segments
}

fn is_boundary(line: &str, start: usize) -> bool {
    if start == 0 {
        return false;
    }
    let before = &line[..start];
    if before.matches('"').count() % 2 == 1 {
        return false;
    }
    if !before.ends_with(char::is_whitespace) {
        return false;
    }
    let previous = before
        .split_whitespace()
        .next_back()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '_'))
        .unwrap_or_default()
        .to_ascii_lowercase();
    !previous.is_empty() && !CONTINUATIONS.contains(&previous.as_str())
}

/// Trim, drop a dangling `and`, and strip trailing separators.
fn clean(segment: &str) -> String {
    let mut s = segment.trim().trim_end_matches(TRAILING_PUNCTUATION).trim_end();
    if let Some(head) = s
        .strip_suffix(" and")
        .or_else(|| s.strip_suffix(" AND"))
        .or_else(|| s.strip_suffix(" And"))
    {
        s = head.trim_end().trim_end_matches(TRAILING_PUNCTUATION).trim_end();
    }
    s.to_string()
}
