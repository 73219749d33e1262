//! Slot extraction: turn a classified match into a [`ParsedInstruction`].
//!
//! One extractor per category reads the capture groups of the winning
//! pattern. A category-independent scan then records every number, quoted
//! string, and identifier-shaped word as a variable slot.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::catalog::{Category, Tag};
use super::classify::Classification;
use super::confidence;
use super::error::{GrammarError, GrammarResult};
use super::matcher::PatternMatch;
use super::model::{
    Condition, ConditionKind, DataKind, Literal, LoopKind, Operation, OperationKind,
    ParsedInstruction,
};

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").unwrap());
static DOUBLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]*)""#).unwrap());
static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""[^"]*"|'[^']*'"#).unwrap());
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap());

/// `… and store it in total`, `… as total`.
static RESULT_TRAILER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:and\s+)?(?:store|save|put|keep)\s+(?:it\s+|the\s+result\s+|this\s+)?(?:in|into|as)|\bas)\s+([A-Za-z_]\w*)\s*[.!]?\s*$",
    )
    .unwrap()
});

/// `total = …` in front of an arithmetic expression.
static RESULT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_]\w*)\s*=[^=]").unwrap());

/// An `else`/`otherwise` with nothing after it, left at the end of the
/// then-action because the else clause needs an action to match.
static DANGLING_ELSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[\s,;])(?:else|otherwise)\s*[,:;.]?\s*$").unwrap());

const DEFAULT_RESULT: &str = "result";
const DEFAULT_LIST: &str = "new_list";
const DEFAULT_DICT: &str = "new_dict";
const DEFAULT_ITEM: &str = "item";
const GET_RESULT: &str = "value";

/// Build the parsed instruction for `text` from its classification.
pub fn extract(
    text: &str,
    classification: &Classification,
    stopwords: &BTreeSet<String>,
) -> GrammarResult<ParsedInstruction> {
    let tag = classification.matched.as_ref().map(|m| m.tag);
    let mut instruction = ParsedInstruction::new(text, classification.category, tag)?;

    if let Some(matched) = &classification.matched {
        match classification.category {
            Category::Arithmetic => arithmetic(&mut instruction, matched, text)?,
            Category::Assignment => assignment(&mut instruction, matched)?,
            Category::Conditional => conditional(&mut instruction, matched)?,
            Category::Loop => looping(&mut instruction, matched)?,
            Category::DataOperation => data_operation(&mut instruction, matched)?,
            Category::Unknown => {}
        }
    }

    scan_variables(&mut instruction, text, stopwords);

    let score = confidence::score(&instruction);
    instruction.metadata_mut().confidence = score;

    debug!(
        category = %instruction.category(),
        operations = instruction.operations().len(),
        conditions = instruction.conditions().len(),
        variables = instruction.variables().len(),
        confidence = score,
        "extracted slots"
    );
    Ok(instruction)
}

fn required<'m>(m: &'m PatternMatch, index: usize, slot: &'static str) -> GrammarResult<&'m str> {
    m.group(index)
        .ok_or(GrammarError::MissingSlot { tag: m.tag, slot })
}

/// Explicit result name from a trailer or a `name = …` prefix.
fn result_variable(text: &str) -> Option<String> {
    RESULT_TRAILER
        .captures(text)
        .or_else(|| RESULT_PREFIX.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn arithmetic(instruction: &mut ParsedInstruction, m: &PatternMatch, text: &str) -> GrammarResult<()> {
    let left = required(m, 0, "left operand")?.to_string();
    let right = required(m, 1, "right operand")?.to_string();
    let (kind, operands) = match m.tag {
        Tag::Add => (OperationKind::Add, vec![left, right]),
        Tag::Subtract => (OperationKind::Subtract, vec![left, right]),
        Tag::SubtractFrom => (OperationKind::Subtract, vec![right, left]),
        Tag::Multiply => (OperationKind::Multiply, vec![left, right]),
        Tag::Divide => (OperationKind::Divide, vec![left, right]),
        other => {
            return Err(GrammarError::MissingSlot {
                tag: other,
                slot: "arithmetic operator",
            });
        }
    };
    let result = result_variable(text).unwrap_or_else(|| DEFAULT_RESULT.to_string());
    instruction.push_operation(Operation::new(kind, operands, Some(result)));
    Ok(())
}

fn assignment(instruction: &mut ParsedInstruction, m: &PatternMatch) -> GrammarResult<()> {
    let (name, value) = match m.tag {
        Tag::AssignTo => (required(m, 1, "variable name")?, required(m, 0, "value")?),
        _ => (required(m, 0, "variable name")?, required(m, 1, "value")?),
    };
    instruction.add_variable(name, Literal::parse(value));
    instruction.push_operation(Operation::new(
        OperationKind::Assign,
        vec![value.to_string()],
        Some(name.to_string()),
    ));
    Ok(())
}

fn conditional(instruction: &mut ParsedInstruction, m: &PatternMatch) -> GrammarResult<()> {
    let kind = if m.tag == Tag::Unless {
        ConditionKind::Unless
    } else {
        ConditionKind::If
    };
    let condition = Condition::new(required(m, 0, "condition")?, kind)?;
    instruction.push_condition(condition);

    let then_block = required(m, 1, "action")?.to_string();
    if DANGLING_ELSE.is_match(&then_block) {
        return Err(GrammarError::MissingSlot {
            tag: m.tag,
            slot: "else action",
        });
    }
    let else_block = m.group(2).map(str::to_string);
    let metadata = instruction.metadata_mut();
    metadata.then_block = Some(then_block);
    metadata.else_block = else_block;
    Ok(())
}

fn looping(instruction: &mut ParsedInstruction, m: &PatternMatch) -> GrammarResult<()> {
    match m.tag {
        Tag::Repeat => {
            let raw = required(m, 0, "repeat count")?;
            let count = raw
                .parse::<u64>()
                .map_err(|_| GrammarError::InvalidCount {
                    count: raw.to_string(),
                })?;
            let body = m.group(1).map(str::to_string);
            let metadata = instruction.metadata_mut();
            metadata.loop_kind = Some(LoopKind::Repeat);
            metadata.count = Some(count);
            metadata.body = body;
        }
        Tag::ForEach | Tag::LoopThrough => {
            let (item, collection, body) = if m.tag == Tag::ForEach {
                (
                    required(m, 0, "loop variable")?.to_string(),
                    required(m, 1, "collection")?.to_string(),
                    m.group(2),
                )
            } else {
                (
                    DEFAULT_ITEM.to_string(),
                    required(m, 0, "collection")?.to_string(),
                    m.group(1),
                )
            };
            instruction.add_variable(item.clone(), None);
            instruction.add_variable(collection.clone(), None);
            let metadata = instruction.metadata_mut();
            metadata.loop_kind = Some(LoopKind::ForEach);
            metadata.item = Some(item);
            metadata.collection = Some(collection);
            metadata.body = body.map(str::to_string);
        }
        Tag::While => {
            let condition = Condition::new(required(m, 0, "loop condition")?, ConditionKind::While)?;
            instruction.push_condition(condition);
            let body = m.group(1).map(str::to_string);
            let metadata = instruction.metadata_mut();
            metadata.loop_kind = Some(LoopKind::While);
            metadata.body = body;
        }
        other => {
            return Err(GrammarError::MissingSlot {
                tag: other,
                slot: "loop kind",
            });
        }
    }
    Ok(())
}

fn data_operation(instruction: &mut ParsedInstruction, m: &PatternMatch) -> GrammarResult<()> {
    let operation = match m.tag {
        Tag::CreateList | Tag::CreateDict => {
            let (kind, default_name) = if m.tag == Tag::CreateList {
                (DataKind::List, DEFAULT_LIST)
            } else {
                (DataKind::Dict, DEFAULT_DICT)
            };
            instruction.metadata_mut().data_kind = Some(kind);
            let name = m.group(0).unwrap_or(default_name).to_string();
            let operands = m.group(1).map(|items| vec![items.to_string()]).unwrap_or_default();
            Operation::new(OperationKind::Create, operands, Some(name))
        }
        Tag::AppendList | Tag::RemoveList => {
            let item = required(m, 0, "item")?.to_string();
            let collection = required(m, 1, "collection")?.to_string();
            let kind = if m.tag == Tag::AppendList {
                OperationKind::Append
            } else {
                OperationKind::Remove
            };
            Operation::new(kind, vec![item, collection.clone()], Some(collection))
        }
        Tag::GetItem => {
            let key = required(m, 0, "key")?.to_string();
            let collection = required(m, 1, "collection")?.to_string();
            Operation::new(
                OperationKind::Get,
                vec![key, collection],
                Some(GET_RESULT.to_string()),
            )
        }
        Tag::UpdateItem => {
            let key = required(m, 0, "key")?.to_string();
            let collection = required(m, 1, "collection")?.to_string();
            let value = required(m, 2, "new value")?.to_string();
            Operation::new(
                OperationKind::Update,
                vec![key, value, collection.clone()],
                Some(collection),
            )
        }
        other => {
            return Err(GrammarError::MissingSlot {
                tag: other,
                slot: "data operation",
            });
        }
    };
    instruction.push_operation(operation);
    Ok(())
}

/// Record numbers as `num_N`, double-quoted strings as `str_N`, and every
/// identifier outside quotes that is not a stopword as a value-less name.
fn scan_variables(instruction: &mut ParsedInstruction, text: &str, stopwords: &BTreeSet<String>) {
    for (i, m) in NUMBER.find_iter(text).enumerate() {
        instruction.add_variable(format!("num_{i}"), Literal::parse(m.as_str()));
    }
    for (i, caps) in DOUBLE_QUOTED.captures_iter(text).enumerate() {
        let value = caps.get(1).map_or("", |g| g.as_str());
        instruction.add_variable(format!("str_{i}"), Some(Literal::Text(value.to_string())));
    }
    let unquoted = QUOTED.replace_all(text, " ");
    for m in IDENTIFIER.find_iter(&unquoted) {
        let word = m.as_str();
        if !stopwords.contains(&word.to_ascii_lowercase()) {
            instruction.add_variable(word, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslatorConfig;
    use crate::grammar::classify::classify;
    use crate::grammar::model::Literal;

    fn parse(text: &str) -> ParsedInstruction {
        let stopwords = TranslatorConfig::default().stopword_set();
        extract(text, &classify(text), &stopwords).unwrap()
    }

    #[test]
    fn arithmetic_default_result() {
        let p = parse("add 5 and 3");
        let op = &p.operations()[0];
        assert_eq!(op.kind, OperationKind::Add);
        assert_eq!(op.operands, ["5", "3"]);
        assert_eq!(op.result_variable.as_deref(), Some("result"));
    }

    #[test]
    fn arithmetic_explicit_result() {
        let p = parse("multiply price by 2 and store it in total");
        assert_eq!(p.operations()[0].result_variable.as_deref(), Some("total"));
        let p = parse("total = price * 2");
        assert_eq!(p.operations()[0].result_variable.as_deref(), Some("total"));
    }

    #[test]
    fn subtract_from_reverses_operands() {
        let p = parse("subtract 3 from 8");
        assert_eq!(p.operations()[0].operands, ["8", "3"]);
        let p = parse("subtract 3 and 8");
        assert_eq!(p.operations()[0].operands, ["3", "8"]);
    }

    #[test]
    fn assignment_slots() {
        let p = parse("set status to active");
        let op = &p.operations()[0];
        assert_eq!(op.kind, OperationKind::Assign);
        assert_eq!(op.operands, ["active"]);
        assert_eq!(op.result_variable.as_deref(), Some("status"));
        assert_eq!(p.variables()["status"], Some(Literal::Text("active".into())));
    }

    #[test]
    fn assign_to_is_value_first() {
        let p = parse("assign 42 to answer");
        let op = &p.operations()[0];
        assert_eq!(op.operands, ["42"]);
        assert_eq!(op.result_variable.as_deref(), Some("answer"));
    }

    #[test]
    fn conditional_stashes_blocks() {
        let p = parse("if score greater than 80 then print excellent else print good");
        assert_eq!(p.conditions()[0].text(), "score greater than 80");
        assert_eq!(p.conditions()[0].referenced_variables(), ["score"]);
        assert_eq!(p.metadata().then_block.as_deref(), Some("print excellent"));
        assert_eq!(p.metadata().else_block.as_deref(), Some("print good"));
    }

    #[test]
    fn dangling_else_is_incomplete() {
        let stopwords = TranslatorConfig::default().stopword_set();
        for text in [
            "if x greater than 5 then print x else",
            "if x greater than 5 then print x, otherwise.",
            "when x equals 0 do print zero else",
        ] {
            let err = extract(text, &classify(text), &stopwords).unwrap_err();
            assert!(
                matches!(err, GrammarError::MissingSlot { slot: "else action", .. }),
                "{text}: {err:?}"
            );
        }
        let p = parse("if x greater than 5 then print \"something else\"");
        assert_eq!(
            p.metadata().then_block.as_deref(),
            Some("print \"something else\"")
        );
    }

    #[test]
    fn unless_is_negated_kind() {
        let p = parse("unless x equals 0 then print nonzero");
        assert_eq!(p.conditions()[0].kind(), ConditionKind::Unless);
    }

    #[test]
    fn repeat_loop() {
        let p = parse("repeat 5 times print hello");
        let md = p.metadata();
        assert_eq!(md.loop_kind, Some(LoopKind::Repeat));
        assert_eq!(md.count, Some(5));
        assert_eq!(md.body.as_deref(), Some("print hello"));
    }

    #[test]
    fn repeat_without_body() {
        let p = parse("repeat 3 times");
        assert_eq!(p.metadata().body, None);
    }

    #[test]
    fn for_each_and_loop_through() {
        let p = parse("for each item in numbers print item");
        assert_eq!(p.metadata().item.as_deref(), Some("item"));
        assert_eq!(p.metadata().collection.as_deref(), Some("numbers"));

        let p = parse("loop through names print item");
        assert_eq!(p.metadata().item.as_deref(), Some("item"));
        assert_eq!(p.metadata().collection.as_deref(), Some("names"));
        assert_eq!(p.metadata().body.as_deref(), Some("print item"));
    }

    #[test]
    fn while_loop_has_condition() {
        let p = parse("while x less than 10 increment x");
        assert_eq!(p.metadata().loop_kind, Some(LoopKind::While));
        assert_eq!(p.conditions()[0].text(), "x less than 10");
        assert_eq!(p.metadata().body.as_deref(), Some("increment x"));
    }

    #[test]
    fn create_list_defaults_name() {
        let p = parse("create list with 1, 2, 3");
        let op = &p.operations()[0];
        assert_eq!(op.kind, OperationKind::Create);
        assert_eq!(op.operands, ["1, 2, 3"]);
        assert_eq!(op.result_variable.as_deref(), Some("new_list"));
        assert_eq!(p.metadata().data_kind, Some(DataKind::List));
    }

    #[test]
    fn create_empty_named_dict() {
        let p = parse("create an empty dictionary called person");
        let op = &p.operations()[0];
        assert!(op.operands.is_empty());
        assert_eq!(op.result_variable.as_deref(), Some("person"));
        assert_eq!(p.metadata().data_kind, Some(DataKind::Dict));
    }

    #[test]
    fn append_remove_get_update() {
        let p = parse("add 4 to numbers");
        assert_eq!(p.operations()[0].operands, ["4", "numbers"]);
        let p = parse("remove 2 from numbers");
        assert_eq!(p.operations()[0].kind, OperationKind::Remove);
        let p = parse("get first from numbers");
        assert_eq!(p.operations()[0].operands, ["first", "numbers"]);
        assert_eq!(p.operations()[0].result_variable.as_deref(), Some("value"));
        let p = parse("update age in person to 30");
        assert_eq!(p.operations()[0].operands, ["age", "30", "person"]);
    }

    #[test]
    fn variable_scan() {
        let p = parse("set greeting to \"hello world\"");
        let vars = p.variables();
        assert_eq!(vars["str_0"], Some(Literal::Text("hello world".into())));
        assert!(vars.contains_key("greeting"));
        assert!(!vars.contains_key("hello"));
        assert!(!vars.contains_key("set"));

        let p = parse("add 5 and 3.5");
        assert_eq!(p.variables()["num_0"], Some(Literal::Int(5)));
        assert_eq!(p.variables()["num_1"], Some(Literal::Float(3.5)));
    }

    #[test]
    fn confidence_recorded() {
        assert_eq!(parse("set x to 10").confidence(), 1.0);
    }
}
