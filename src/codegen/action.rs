//! Action phrases: the `then`/`else`/loop-body parts of an instruction.
//!
//! Each phrase is one or more actions separated by `;` or newlines. Every
//! action must match one of the known forms; anything else is an error
//! rather than a guess.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::error::{SynthesisError, SynthesisResult};
use super::literal::{render_number, render_operand, render_value};
use super::symbols::SymbolTable;

macro_rules! action {
    ($pattern:literal) => {
        LazyLock::new(|| Regex::new(concat!(r"(?i)^", $pattern, r"$")).unwrap())
    };
}

static PRINT: LazyLock<Regex> =
    action!(r"(?:print|display|show|say|output|echo)(?:\s+(?:out\s+)?(.+?))?");
static INCREMENT: LazyLock<Regex> =
    action!(r"(?:increment|increase)\s+([A-Za-z_]\w*)(?:\s+by\s+(\S+))?");
static DECREMENT: LazyLock<Regex> =
    action!(r"(?:decrement|decrease)\s+([A-Za-z_]\w*)(?:\s+by\s+(\S+))?");
static ADD_TO: LazyLock<Regex> = action!(r"add\s+(.+?)\s+to\s+([A-Za-z_]\w*)");
static APPEND_TO: LazyLock<Regex> =
    action!(r"(?:append|push)\s+(.+?)\s+(?:to|onto|into)\s+([A-Za-z_]\w*)");
static SUBTRACT_FROM: LazyLock<Regex> =
    action!(r"subtract\s+(\S+)\s+from\s+([A-Za-z_]\w*)");
static MULTIPLY_BY: LazyLock<Regex> = action!(r"multiply\s+([A-Za-z_]\w*)\s+by\s+(\S+)");
static DIVIDE_BY: LazyLock<Regex> = action!(r"divide\s+([A-Za-z_]\w*)\s+by\s+(\S+)");
static REMOVE_FROM: LazyLock<Regex> =
    action!(r"(?:remove|delete)\s+(.+?)\s+from\s+([A-Za-z_]\w*)");
static SET: LazyLock<Regex> = action!(r"(?:set|let)\s+([A-Za-z_]\w*)\s+(?:to|=|be)\s+(.+)");
static PASS: LazyLock<Regex> = action!(r"(?:do\s+nothing|nothing|pass|skip)");
static BREAK: LazyLock<Regex> = action!(r"(?:break|stop(?:\s+the\s+loop)?)");
static CONTINUE: LazyLock<Regex> = action!(r"(?:continue|next)");

/// Render every action in `phrase` as one Python statement each.
///
/// Names bound by `set X to V` are visible to later actions of the same
/// phrase.
pub fn render_actions(phrase: &str, symbols: &SymbolTable) -> SynthesisResult<Vec<String>> {
    let mut scope = symbols.clone();
    let mut statements = Vec::new();
    for action in split_actions(phrase) {
        let statement = render_action(&action, &scope)?;
        if let Some(caps) = SET.captures(&action) {
            scope.define(&caps[1]);
        }
        statements.push(statement);
    }
    if statements.is_empty() {
        statements.push("pass".to_string());
    }
    Ok(statements)
}

fn render_action(action: &str, symbols: &SymbolTable) -> SynthesisResult<String> {
    let group = |caps: &Captures, i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();

    if PASS.is_match(action) {
        return Ok("pass".into());
    }
    if BREAK.is_match(action) {
        return Ok("break".into());
    }
    if CONTINUE.is_match(action) {
        return Ok("continue".into());
    }
    if let Some(caps) = PRINT.captures(action) {
        return Ok(match caps.get(1) {
            Some(arg) => format!("print({})", print_argument(arg.as_str(), symbols)),
            None => "print()".into(),
        });
    }
    if let Some(caps) = INCREMENT.captures(action) {
        return Ok(augmented(&group(&caps, 1), "+=", caps.get(2).map(|m| m.as_str())));
    }
    if let Some(caps) = DECREMENT.captures(action) {
        return Ok(augmented(&group(&caps, 1), "-=", caps.get(2).map(|m| m.as_str())));
    }
    if let Some(caps) = ADD_TO.captures(action) {
        let (value, target) = (group(&caps, 1), group(&caps, 2));
        return Ok(match render_number(value.trim()) {
            Some(number) => format!("{target} += {number}"),
            None => format!("{target}.append({})", value_or_quoted(&value, symbols)),
        });
    }
    if let Some(caps) = APPEND_TO.captures(action) {
        let (value, target) = (group(&caps, 1), group(&caps, 2));
        return Ok(format!("{target}.append({})", value_or_quoted(&value, symbols)));
    }
    if let Some(caps) = SUBTRACT_FROM.captures(action) {
        return Ok(augmented(&group(&caps, 2), "-=", Some(group(&caps, 1).as_str())));
    }
    if let Some(caps) = MULTIPLY_BY.captures(action) {
        return Ok(augmented(&group(&caps, 1), "*=", Some(group(&caps, 2).as_str())));
    }
    if let Some(caps) = DIVIDE_BY.captures(action) {
        return Ok(augmented(&group(&caps, 1), "/=", Some(group(&caps, 2).as_str())));
    }
    if let Some(caps) = REMOVE_FROM.captures(action) {
        let (value, target) = (group(&caps, 1), group(&caps, 2));
        return Ok(format!("{target}.remove({})", value_or_quoted(&value, symbols)));
    }
    if let Some(caps) = SET.captures(action) {
        let (name, value) = (group(&caps, 1), group(&caps, 2));
        let value = render_value(&value, symbols)
            .ok_or_else(|| SynthesisError::MissingValue { name: name.clone() })?;
        return Ok(format!("{name} = {value}"));
    }
    Err(SynthesisError::UnknownAction {
        phrase: action.to_string(),
    })
}

/// `print the total` prints `total` when it is a known name.
fn print_argument(raw: &str, symbols: &SymbolTable) -> String {
    let raw = raw.trim();
    if let Some(rest) = raw
        .strip_prefix("the ")
        .or_else(|| raw.strip_prefix("The "))
    {
        if symbols.contains(rest.trim()) {
            return rest.trim().to_string();
        }
    }
    value_or_quoted(raw, symbols)
}

fn value_or_quoted(raw: &str, symbols: &SymbolTable) -> String {
    render_value(raw, symbols).unwrap_or_else(|| "\"\"".to_string())
}

fn augmented(target: &str, op: &str, amount: Option<&str>) -> String {
    let amount = amount.map_or_else(|| "1".to_string(), render_operand);
    format!("{target} {op} {amount}")
}

/// Split on `;` and newlines outside quotes, trimming trailing sentence
/// punctuation from each piece.
fn split_actions(phrase: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in phrase.chars() {
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
            None if c == ';' || c == '\n' => pieces.push(std::mem::take(&mut current)),
            None => current.push(c),
        }
    }
    pieces.push(current);
    pieces
        .into_iter()
        .map(|p| p.trim().trim_end_matches(['.', '!', ',']).trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(phrase: &str) -> Vec<String> {
        render_actions(phrase, &SymbolTable::new()).unwrap()
    }

    fn render_with(phrase: &str, names: &[&str]) -> Vec<String> {
        let symbols: SymbolTable = names.iter().copied().collect();
        render_actions(phrase, &symbols).unwrap()
    }

    #[test]
    fn print_literal_or_variable() {
        assert_eq!(render("print yes"), ["print(\"yes\")"]);
        assert_eq!(render("print not freezing"), ["print(\"not freezing\")"]);
        assert_eq!(render_with("print item", &["item"]), ["print(item)"]);
        assert_eq!(render_with("display the total", &["total"]), ["print(total)"]);
        assert_eq!(render("say 42"), ["print(42)"]);
        assert_eq!(render("print"), ["print()"]);
    }

    #[test]
    fn counters() {
        assert_eq!(render("increment x"), ["x += 1"]);
        assert_eq!(render("increase x by 5"), ["x += 5"]);
        assert_eq!(render("decrement count by 2"), ["count -= 2"]);
        assert_eq!(render("subtract 3 from total"), ["total -= 3"]);
        assert_eq!(render("multiply x by 2"), ["x *= 2"]);
    }

    #[test]
    fn add_to_number_or_collection() {
        assert_eq!(render("add 5 to total"), ["total += 5"]);
        assert_eq!(render("add apple to basket"), ["basket.append(\"apple\")"]);
        assert_eq!(render_with("add item to seen", &["item"]), ["seen.append(item)"]);
        assert_eq!(render("remove apple from basket"), ["basket.remove(\"apple\")"]);
    }

    #[test]
    fn set_binds_for_later_actions() {
        assert_eq!(
            render("set flag to true; print flag"),
            ["flag = True", "print(flag)"]
        );
    }

    #[test]
    fn control_flow() {
        assert_eq!(render("do nothing"), ["pass"]);
        assert_eq!(render("break"), ["break"]);
        assert_eq!(render("continue"), ["continue"]);
        assert_eq!(render(""), ["pass"]);
    }

    #[test]
    fn quoted_separator_is_not_split() {
        assert_eq!(render("print \"a; b\""), ["print(\"a; b\")"]);
    }

    #[test]
    fn unknown_action_is_error() {
        let err = render_actions("dance wildly", &SymbolTable::new()).unwrap_err();
        assert!(matches!(err, SynthesisError::UnknownAction { phrase } if phrase == "dance wildly"));
    }
}
