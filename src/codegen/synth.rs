//! Template emission: one Python fragment per [`ParsedInstruction`].
//!
//! Every fragment is parsed before it is returned. A fragment that does not
//! parse is reported as [`SynthesisError::Syntax`] and never handed out as
//! code. The same parse tree feeds the lint pass, whose findings ride along
//! as warnings.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::grammar::{
    Category, Condition, ConditionKind, DataKind, LoopKind, Operation, OperationKind,
    ParsedInstruction,
};
use crate::pysyntax;

use super::action::render_actions;
use super::condition::rewrite_condition;
use super::error::{SynthesisError, SynthesisResult};
use super::lint::lint;
use super::literal::{render_dict, render_index, render_list, render_operand, render_value};
use super::symbols::SymbolTable;
use super::warning::Warning;

const INDENT: &str = "    ";
const DEFAULT_RESULT: &str = "result";
const DEFAULT_LIST: &str = "new_list";
const DEFAULT_DICT: &str = "new_dict";

/// A synthesized fragment that is known to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub code: String,
    pub warnings: Vec<Warning>,
    /// Names the fragment binds, for later statements of the same input.
    pub defined: BTreeSet<String>,
}

/// Maps parsed instructions to Python, resolving bare words against the
/// names bound so far.
pub struct Synthesizer<'a> {
    symbols: &'a SymbolTable,
    large_range_threshold: u64,
}

impl<'a> Synthesizer<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            large_range_threshold: 10_000,
        }
    }

    pub fn with_large_range_threshold(mut self, threshold: u64) -> Self {
        self.large_range_threshold = threshold;
        self
    }

    pub fn synthesize(&self, instruction: &ParsedInstruction) -> SynthesisResult<Fragment> {
        let category = instruction.category();
        let lines = match category {
            Category::Arithmetic => self.arithmetic(instruction.operations())?,
            Category::Assignment => self.assignment(instruction.operations())?,
            Category::Conditional => self.conditional(instruction)?,
            Category::Loop => self.looping(instruction)?,
            Category::DataOperation => self.data_operation(instruction)?,
            Category::Unknown => return Err(SynthesisError::UnknownCategory),
        };
        if lines.is_empty() {
            return Err(SynthesisError::EmptyFragment { category });
        }
        let code = lines.join("\n");

        let module = match pysyntax::parse(&code) {
            Ok(module) => module,
            Err(source) => {
                warn!(
                    %category,
                    line = source.line,
                    message = %source.message,
                    code = %code,
                    "generated fragment failed the syntax check"
                );
                return Err(SynthesisError::Syntax { code, source });
            }
        };

        let report = lint(&module, self.symbols, self.large_range_threshold);
        debug!(
            %category,
            lines = lines.len(),
            warnings = report.warnings.len(),
            "synthesized fragment"
        );
        Ok(Fragment {
            code,
            warnings: report.warnings,
            defined: report.defined,
        })
    }

    fn arithmetic(&self, operations: &[Operation]) -> SynthesisResult<Vec<String>> {
        let mut lines = Vec::new();
        for op in operations {
            let Some(symbol) = op.kind.symbol() else {
                continue;
            };
            let [left, right, ..] = op.operands.as_slice() else {
                return Err(SynthesisError::MissingOperands {
                    kind: op.kind,
                    needed: 2,
                    found: op.operands.len(),
                });
            };
            let result = op.result_variable.as_deref().unwrap_or(DEFAULT_RESULT);
            lines.push(format!(
                "{result} = {} {symbol} {}",
                render_operand(left),
                render_operand(right)
            ));
        }
        Ok(lines)
    }

    fn assignment(&self, operations: &[Operation]) -> SynthesisResult<Vec<String>> {
        let mut scope = self.symbols.clone();
        let mut lines = Vec::new();
        for op in operations.iter().filter(|op| op.kind == OperationKind::Assign) {
            let name = op
                .result_variable
                .as_deref()
                .ok_or(SynthesisError::MissingSlot {
                    slot: "assignment target",
                })?;
            let value = op
                .operands
                .first()
                .and_then(|raw| render_value(raw, &scope))
                .ok_or_else(|| SynthesisError::MissingValue {
                    name: name.to_string(),
                })?;
            lines.push(format!("{name} = {value}"));
            scope.define(name);
        }
        Ok(lines)
    }

    fn conditional(&self, instruction: &ParsedInstruction) -> SynthesisResult<Vec<String>> {
        let condition = first_condition(instruction)?;
        let scope = self.scope_with(condition.referenced_variables());
        let metadata = instruction.metadata();

        let then_block = metadata
            .then_block
            .as_deref()
            .ok_or(SynthesisError::MissingSlot { slot: "then action" })?;

        let mut lines = vec![format!("if {}:", test_expression(condition))];
        lines.extend(indented(render_actions(then_block, &scope)?));
        if let Some(else_block) = metadata.else_block.as_deref() {
            lines.push("else:".to_string());
            lines.extend(indented(render_actions(else_block, &scope)?));
        }
        Ok(lines)
    }

    fn looping(&self, instruction: &ParsedInstruction) -> SynthesisResult<Vec<String>> {
        let metadata = instruction.metadata();
        let kind = metadata
            .loop_kind
            .ok_or(SynthesisError::MissingSlot { slot: "loop kind" })?;

        let (header, scope) = match kind {
            LoopKind::Repeat => {
                let count = metadata
                    .count
                    .ok_or(SynthesisError::MissingSlot { slot: "repeat count" })?;
                (format!("for _ in range({count}):"), self.symbols.clone())
            }
            LoopKind::ForEach => {
                let item = metadata
                    .item
                    .as_deref()
                    .ok_or(SynthesisError::MissingSlot { slot: "loop variable" })?;
                let collection = metadata
                    .collection
                    .as_deref()
                    .ok_or(SynthesisError::MissingSlot { slot: "collection" })?;
                (
                    format!("for {item} in {collection}:"),
                    self.scope_with([item]),
                )
            }
            LoopKind::While => {
                let condition = first_condition(instruction)?;
                (
                    format!("while {}:", test_expression(condition)),
                    self.scope_with(condition.referenced_variables()),
                )
            }
        };

        let body = match metadata.body.as_deref() {
            Some(body) => render_actions(body, &scope)?,
            None => vec!["pass".to_string()],
        };
        let mut lines = vec![header];
        lines.extend(indented(body));
        Ok(lines)
    }

    fn data_operation(&self, instruction: &ParsedInstruction) -> SynthesisResult<Vec<String>> {
        let data_kind = instruction.metadata().data_kind;
        let mut lines = Vec::new();
        for op in instruction.operations() {
            let line = match op.kind {
                OperationKind::Create => {
                    let items = op.operands.first().map_or("", String::as_str);
                    match data_kind {
                        Some(DataKind::Dict) => {
                            let name = op.result_variable.as_deref().unwrap_or(DEFAULT_DICT);
                            format!("{name} = {}", render_dict(items, self.symbols))
                        }
                        Some(DataKind::List) | None => {
                            let name = op.result_variable.as_deref().unwrap_or(DEFAULT_LIST);
                            format!("{name} = {}", render_list(items, self.symbols))
                        }
                    }
                }
                OperationKind::Append | OperationKind::Remove => {
                    let [item, collection] = operands::<2>(op)?;
                    let method = if op.kind == OperationKind::Append {
                        "append"
                    } else {
                        "remove"
                    };
                    let value = render_value(item, self.symbols).ok_or_else(|| {
                        SynthesisError::MissingValue {
                            name: collection.to_string(),
                        }
                    })?;
                    format!("{collection}.{method}({value})")
                }
                OperationKind::Get => {
                    let [key, collection] = operands::<2>(op)?;
                    let result = op.result_variable.as_deref().unwrap_or("value");
                    format!("{result} = {collection}[{}]", render_index(key, self.symbols))
                }
                OperationKind::Update => {
                    let [key, value, collection] = operands::<3>(op)?;
                    let value = render_value(value, self.symbols).ok_or_else(|| {
                        SynthesisError::MissingValue {
                            name: collection.to_string(),
                        }
                    })?;
                    format!("{collection}[{}] = {value}", render_index(key, self.symbols))
                }
                _ => continue,
            };
            lines.push(line);
        }
        Ok(lines)
    }

    fn scope_with<I, S>(&self, names: I) -> SymbolTable
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scope = self.symbols.clone();
        scope.extend(names.into_iter().map(|n| n.as_ref().to_string()));
        scope
    }
}

fn first_condition(instruction: &ParsedInstruction) -> SynthesisResult<&Condition> {
    instruction
        .conditions()
        .first()
        .ok_or(SynthesisError::MissingSlot { slot: "condition" })
}

fn test_expression(condition: &Condition) -> String {
    let test = rewrite_condition(condition.text());
    match condition.kind() {
        ConditionKind::Unless => format!("not ({test})"),
        ConditionKind::If | ConditionKind::While => test,
    }
}

fn indented(lines: Vec<String>) -> impl Iterator<Item = String> {
    lines.into_iter().map(|line| format!("{INDENT}{line}"))
}

/// The first `N` operands, or a [`SynthesisError::MissingOperands`].
fn operands<const N: usize>(op: &Operation) -> SynthesisResult<&[String; N]> {
    op.operands
        .get(..N)
        .and_then(|head| head.try_into().ok())
        .ok_or(SynthesisError::MissingOperands {
            kind: op.kind,
            needed: N,
            found: op.operands.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::warning::WarningKind;
    use crate::config::TranslatorConfig;
    use crate::grammar::{classify, extract};

    fn synth_with(text: &str, symbols: &SymbolTable) -> SynthesisResult<Fragment> {
        let stopwords = TranslatorConfig::default().stopword_set();
        let parsed = extract(text, &classify(text), &stopwords).unwrap();
        Synthesizer::new(symbols).synthesize(&parsed)
    }

    fn code(text: &str) -> String {
        synth_with(text, &SymbolTable::new()).unwrap().code
    }

    #[test]
    fn arithmetic_templates() {
        assert_eq!(code("add 5 and 3"), "result = 5 + 3");
        assert_eq!(code("subtract 3 from 8"), "result = 8 - 3");
        assert_eq!(code("multiply x by 2"), "result = x * 2");
        assert_eq!(code("divide 10 by 2"), "result = 10 / 2");
        assert_eq!(code("multiply price by 2 and store it in total"), "total = price * 2");
    }

    #[test]
    fn division_by_literal_zero_warns() {
        let fragment = synth_with("divide 10 by 0", &SymbolTable::new()).unwrap();
        assert_eq!(fragment.code, "result = 10 / 0");
        assert!(fragment.warnings.iter().any(|w| w.kind == WarningKind::DivisionByZero));
    }

    #[test]
    fn assignment_quoting() {
        assert_eq!(code("set status to active"), "status = \"active\"");
        assert_eq!(code("set age to 25"), "age = 25");
        assert_eq!(code("set done to true"), "done = True");
        assert_eq!(code("assign 42 to answer"), "answer = 42");
        assert_eq!(code("create variable name with value hello"), "name = \"hello\"");
    }

    #[test]
    fn assignment_of_known_name_is_bare() {
        let symbols: SymbolTable = ["x"].into_iter().collect();
        assert_eq!(synth_with("set y to x", &symbols).unwrap().code, "y = x");
    }

    #[test]
    fn conditional_with_else() {
        assert_eq!(
            code("if score greater than 80 then print excellent else print good"),
            "if score > 80:\n    print(\"excellent\")\nelse:\n    print(\"good\")"
        );
    }

    #[test]
    fn conditional_prints_condition_variable() {
        assert_eq!(code("if x greater than 5 then print x"), "if x > 5:\n    print(x)");
    }

    #[test]
    fn unless_negates() {
        assert_eq!(
            code("unless x equals 0 then print nonzero"),
            "if not (x == 0):\n    print(\"nonzero\")"
        );
    }

    #[test]
    fn loops() {
        assert_eq!(
            code("repeat 5 times print hello"),
            "for _ in range(5):\n    print(\"hello\")"
        );
        assert_eq!(
            code("for each item in numbers print item"),
            "for item in numbers:\n    print(item)"
        );
        assert_eq!(
            code("while x less than 10 increment x"),
            "while x < 10:\n    x += 1"
        );
        assert_eq!(code("repeat 3 times"), "for _ in range(3):\n    pass");
    }

    #[test]
    fn large_repeat_warns() {
        let fragment = synth_with("repeat 50000 times print hi", &SymbolTable::new()).unwrap();
        assert!(fragment.warnings.iter().any(|w| w.kind == WarningKind::LargeRange));
    }

    #[test]
    fn data_operations() {
        assert_eq!(code("create list with 1, 2, 3"), "new_list = [1, 2, 3]");
        assert_eq!(
            code("create dictionary with name John and age 25"),
            "new_dict = {\"name\": \"John\", \"age\": 25}"
        );
        assert_eq!(code("create an empty list called todo"), "todo = []");
        assert_eq!(code("add item to my_list"), "my_list.append(\"item\")");
        assert_eq!(code("remove 2 from numbers"), "numbers.remove(2)");
        assert_eq!(code("get first from numbers"), "value = numbers[0]");
        assert_eq!(code("update age in person to 30"), "person[\"age\"] = 30");
    }

    #[test]
    fn fragments_record_bindings() {
        let fragment = synth_with("set x to 10", &SymbolTable::new()).unwrap();
        assert!(fragment.defined.contains("x"));
    }

    #[test]
    fn unknown_action_fails() {
        let err = synth_with("if x greater than 5 then dance", &SymbolTable::new()).unwrap_err();
        assert!(matches!(err, SynthesisError::UnknownAction { .. }));
    }

    #[test]
    fn unparsable_fragment_is_syntax_error() {
        let err = synth_with("set class to 5", &SymbolTable::new()).unwrap_err();
        match err {
            SynthesisError::Syntax { code, source } => {
                assert_eq!(code, "class = 5");
                assert_eq!(source.line, 1);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let parsed = ParsedInstruction::new("hello world", Category::Unknown, None).unwrap();
        let symbols = SymbolTable::new();
        assert_eq!(
            Synthesizer::new(&symbols).synthesize(&parsed),
            Err(SynthesisError::UnknownCategory)
        );
    }
}
