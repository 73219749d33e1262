//! Coercion of raw English value phrases into Python literals.
//!
//! Numbers stay bare, `true`/`false`/`none` take Python's spelling, quoted
//! text is re-quoted with double quotes, and a bare word becomes a string
//! unless the symbol table says it names a variable.

use std::sync::LazyLock;

use regex::Regex;

use super::symbols::SymbolTable;

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(-?)(\d+)$").unwrap());
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(?:\d+\.\d*|\.\d+)$").unwrap());
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*$").unwrap());
static AND_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());
static LEADING_AND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^and\s+").unwrap());

/// Python source for a raw value phrase, or `None` when nothing is left
/// after trimming.
pub fn render_value(raw: &str, symbols: &SymbolTable) -> Option<String> {
    let value = raw.trim().trim_end_matches(['.', '!']).trim();
    if value.is_empty() {
        return None;
    }
    if let Some(number) = render_number(value) {
        return Some(number);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" => return Some("True".into()),
        "false" => return Some("False".into()),
        "none" | "null" => return Some("None".into()),
        _ => {}
    }
    if let Some(inner) = unquote(value) {
        return Some(python_string(inner));
    }
    if IDENTIFIER.is_match(value) && symbols.contains(value) {
        return Some(value.to_string());
    }
    Some(python_string(value))
}

/// An arithmetic operand: numbers normalised, identifiers passed through.
pub fn render_operand(raw: &str) -> String {
    let raw = raw.trim();
    render_number(raw).unwrap_or_else(|| raw.to_string())
}

/// Python number literal for `text`, if it is one.
///
/// Integers lose leading zeros (`007` is not valid Python 3); decimals are
/// kept as written.
pub fn render_number(text: &str) -> Option<String> {
    if let Some(caps) = INTEGER.captures(text) {
        let sign = caps.get(1).map_or("", |m| m.as_str());
        let digits = caps.get(2).map_or("", |m| m.as_str()).trim_start_matches('0');
        let digits = if digits.is_empty() { "0" } else { digits };
        let sign = if digits == "0" { "" } else { sign };
        return Some(format!("{sign}{digits}"));
    }
    if DECIMAL.is_match(text) {
        return Some(text.to_string());
    }
    None
}

/// Double-quoted Python string literal.
pub fn python_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Contents of a `"…"` or `'…'` literal.
pub fn unquote(text: &str) -> Option<&str> {
    if text.len() < 2 {
        return None;
    }
    let first = text.chars().next()?;
    if (first == '"' || first == '\'') && text.ends_with(first) {
        let inner = &text[1..text.len() - 1];
        if !inner.contains(first) {
            return Some(inner);
        }
    }
    None
}

pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER.is_match(text)
}

/// Split an item list on `,`/`;` outside quotes, then on ` and ` in pieces
/// without quotes.
pub fn split_items(raw: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in raw.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
            }
            None if c == ',' || c == ';' => pieces.push(std::mem::take(&mut current)),
            None => current.push(c),
        }
    }
    pieces.push(current);

    let mut items = Vec::new();
    for piece in pieces {
        let piece = piece.trim();
        let piece = LEADING_AND.replace(piece, "");
        if piece.contains(['"', '\'']) {
            items.push(piece.trim().to_string());
        } else {
            items.extend(AND_SEPARATOR.split(&piece).map(|s| s.trim().to_string()));
        }
    }
    items.retain(|item| !item.is_empty());
    items
}

/// `[a, b, c]` from a raw item list.
pub fn render_list(raw: &str, symbols: &SymbolTable) -> String {
    let items: Vec<String> = split_items(raw)
        .iter()
        .filter_map(|item| render_value(item, symbols))
        .collect();
    format!("[{}]", items.join(", "))
}

/// `{"k": v, …}` from pairs like `name John and age 25` or `a: 1, b: 2`.
pub fn render_dict(raw: &str, symbols: &SymbolTable) -> String {
    let entries: Vec<String> = split_items(raw)
        .iter()
        .map(|pair| {
            let (key, value) = split_pair(pair);
            let value = value
                .and_then(|v| render_value(v, symbols))
                .unwrap_or_else(|| "None".to_string());
            format!("{}: {}", render_key(key), value)
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Dictionary key: numbers bare, everything else a string.
pub fn render_key(raw: &str) -> String {
    let key = raw.trim();
    if let Some(number) = render_number(key) {
        return number;
    }
    python_string(unquote(key).unwrap_or(key))
}

/// Subscript for `get K from C`: ordinals become positions, numbers stay
/// bare, known names stay names, other words become string keys.
pub fn render_index(raw: &str, symbols: &SymbolTable) -> String {
    let key = raw.trim();
    let ordinal = match key.to_ascii_lowercase().as_str() {
        "first" => Some("0"),
        "second" => Some("1"),
        "third" => Some("2"),
        "fourth" => Some("3"),
        "fifth" => Some("4"),
        "last" => Some("-1"),
        _ => None,
    };
    if let Some(position) = ordinal {
        return position.to_string();
    }
    if let Some(number) = render_number(key) {
        return number;
    }
    if is_identifier(key) && symbols.contains(key) {
        return key.to_string();
    }
    render_key(key)
}

/// Key and optional value of one dictionary pair. The separator is the
/// first `:` or `=` outside quotes, else the first run of whitespace.
fn split_pair(pair: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    for (i, c) in pair.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ':' || c == '=' => {
                return (pair[..i].trim(), Some(pair[i + 1..].trim()));
            }
            None => {}
        }
    }
    let trimmed = pair.trim();
    if unquote(trimmed).is_some() {
        return (trimmed, None);
    }
    match trimmed.split_once(char::is_whitespace) {
        Some((key, value)) => (key, Some(value.trim())),
        None => (trimmed, None),
    }
}
