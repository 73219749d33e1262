//! End-to-end tests for the translation pipeline.
//!
//! These go through the public `Translator` API only and check the
//! properties every caller relies on: determinism, syntactically valid
//! output, the category templates, and the failure messages.

use eng2py::codegen::{Severity, WarningKind};
use eng2py::error::TranslateError;
use eng2py::pipeline::{Outcome, SUPPORTED_PATTERNS, Translator};
use eng2py::pysyntax;

fn translate(text: &str) -> Outcome {
    Translator::default().translate(text)
}

fn code(text: &str) -> String {
    match translate(text) {
        Outcome::Success { code, .. } => code,
        Outcome::Failure { error } => panic!("{text:?} failed: {error}"),
    }
}

/// Inputs that should all translate; used by the invariant tests.
const CORPUS: &[&str] = &[
    "add 5 and 3",
    "subtract 3 from 8",
    "multiply x by 2",
    "divide 10 by 2",
    "divide 10 by 0",
    "calculate 7 plus 2",
    "calculate the sum of 4 and 6",
    "multiply price by 2 and store it in total",
    "set status to active",
    "set age to 25",
    "set name to \"Ada Lovelace\"",
    "assign 42 to answer",
    "create variable name with value hello",
    "if score greater than 80 then print excellent else print good",
    "if x greater than 5 then print x",
    "when count equals 0 do print empty",
    "unless x equals 0 then print nonzero",
    "if x is at least 3 then set y to 1; print y",
    "repeat 5 times print hello",
    "repeat 50000 times print hi",
    "for each item in numbers print item",
    "loop through numbers",
    "while x less than 10 increment x",
    "create list with 1, 2, 3",
    "create dictionary with name John and age 25",
    "create an empty list called todo",
    "add item to my_list",
    "remove 2 from numbers",
    "get first from numbers",
    "update age in person to 30",
    "set x to 10\nset y to 20\nadd x and y",
    "set x to 10 set y to 20",
];

#[test]
fn translation_is_deterministic() {
    let translator = Translator::default();
    for text in CORPUS {
        assert_eq!(translator.translate(text), translator.translate(text), "{text}");
        assert_eq!(translator.translate(text), translate(text), "{text}");
    }
}

#[test]
fn every_success_parses_as_python() {
    for text in CORPUS {
        let code = code(text);
        assert!(!code.trim().is_empty(), "{text}");
        if let Err(e) = pysyntax::check(&code) {
            panic!("{text:?} produced invalid code:\n{code}\n{e}");
        }
    }
}

#[test]
fn every_catalog_example_translates() {
    for group in SUPPORTED_PATTERNS {
        for example in group.examples {
            let outcome = translate(example);
            assert!(
                outcome.is_success(),
                "{} example {example:?} failed: {:?}",
                group.name(),
                outcome.error_message()
            );
        }
    }
}

#[test]
fn arithmetic_maps_to_operators() {
    assert!(code("add 5 and 3").contains("5 + 3"));
    assert!(code("subtract 3 from 8").contains(" - "));
    assert!(code("multiply x by 2").contains(" * "));
    assert!(code("divide 10 by 2").contains(" / "));
}

#[test]
fn assignment_quotes_words_not_numbers() {
    assert_eq!(code("set status to active"), "status = \"active\"");
    assert_eq!(code("set age to 25"), "age = 25");
}

#[test]
fn conditional_has_both_branches() {
    let code = code("if score greater than 80 then print excellent else print good");
    assert!(code.starts_with("if score > 80:"));
    assert!(code.contains("\nelse:\n"));
    assert!(code.contains("print(\"excellent\")"));
    assert!(code.contains("print(\"good\")"));
}

#[test]
fn unknown_input_lists_examples() {
    let outcome = translate("hello world");
    assert!(!outcome.is_success());
    assert!(outcome.code().is_none());
    let message = outcome.error_message().unwrap();
    let mentions_example = SUPPORTED_PATTERNS
        .iter()
        .flat_map(|group| group.examples.iter())
        .any(|example| message.contains(example));
    assert!(mentions_example, "{message}");
}

#[test]
fn length_boundaries() {
    assert!(matches!(
        translate("").error(),
        Some(TranslateError::Empty { .. })
    ));
    assert!(matches!(
        translate("  ab  ").error(),
        Some(TranslateError::TooShort { .. })
    ));
    let long = format!("set x to {}", "9".repeat(992));
    assert_eq!(long.chars().count(), 1001);
    assert!(matches!(
        translate(&long).error(),
        Some(TranslateError::TooLong { length: 1001, .. })
    ));
    let limit = format!("set x to {}", "9".repeat(991));
    assert!(!matches!(
        translate(&limit).error(),
        Some(TranslateError::TooLong { .. })
    ));
}

#[test]
fn banned_content_is_refused() {
    let outcome = translate("import os and delete everything");
    assert!(matches!(
        outcome.error(),
        Some(TranslateError::UnsafeContent { .. })
    ));
    assert!(outcome.error_message().unwrap().contains("potentially unsafe content"));
}

#[test]
fn multi_statement_fails_fast() {
    let outcome = translate("set x to 1\nhello world\nset y to 2");
    assert!(outcome.code().is_none());
    let error = outcome.error().unwrap();
    match error {
        TranslateError::Statement { index, text, .. } => {
            assert_eq!(*index, 2);
            assert_eq!(text, "hello world");
        }
        other => panic!("expected a statement error, got {other:?}"),
    }
    assert!(matches!(
        error.root(),
        TranslateError::UnrecognizedPattern { .. }
    ));
    let message = outcome.error_message().unwrap();
    assert!(message.contains("statement 2"));
    assert!(message.contains("hello world"));
}

#[test]
fn multi_statement_joins_fragments() {
    let outcome = translate("set x to 10\nset y to 20\nadd x and y");
    assert_eq!(outcome.code(), Some("x = 10\ny = 20\nresult = x + y"));
    let info = outcome.warnings().last().unwrap();
    assert_eq!(info.kind, WarningKind::MultipleStatements);
    assert_eq!(info.severity, Severity::Info);
    assert!(
        !outcome
            .warnings()
            .iter()
            .any(|w| w.kind == WarningKind::UndefinedVariable)
    );
}

#[test]
fn warnings_are_not_failures() {
    let outcome = translate("divide 10 by 0");
    assert!(outcome.is_success());
    let lines = outcome.warning_lines();
    assert!(lines.iter().any(|l| l.starts_with("[HIGH] Division by zero")));

    let outcome = translate("repeat 50000 times print hi");
    assert!(outcome.is_success());
    assert!(
        outcome
            .warnings()
            .iter()
            .any(|w| w.kind == WarningKind::LargeRange)
    );
}

#[test]
fn undefined_names_are_flagged() {
    let outcome = translate("multiply price by 2");
    assert!(
        outcome
            .warnings()
            .iter()
            .any(|w| w.kind == WarningKind::UndefinedVariable && w.message.contains("price"))
    );
}

#[test]
fn translator_can_be_shared_across_threads() {
    let translator = Translator::default();
    std::thread::scope(|scope| {
        let handles: Vec<_> = CORPUS
            .iter()
            .map(|text| {
                let translator = &translator;
                scope.spawn(move || translator.translate(text))
            })
            .collect();
        for (handle, text) in handles.into_iter().zip(CORPUS) {
            assert_eq!(handle.join().unwrap(), translate(text));
        }
    });
}

#[test]
fn json_report_shape() {
    let report = translate("add 5 and 3").report();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["code"], "result = 5 + 3");
    assert!(value.get("error_message").is_none());

    let report = translate("hello world").report();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["success"], false);
    assert!(value.get("code").is_none());
    assert!(value["error_message"].as_str().unwrap().starts_with("Unable to recognize"));
}

#[test]
fn deeply_nested_condition_fails_cleanly() {
    let depth = 200;
    let text = format!(
        "if {}x{} greater than 5 then print y",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let outcome = translate(&text);
    assert!(!outcome.is_success());
    assert!(matches!(
        outcome.error(),
        Some(TranslateError::InvalidSyntax { message, .. }) if message == "too many nested parentheses"
    ));

    let shallow = format!("if {}x{} greater than 5 then print y", "(".repeat(20), ")".repeat(20));
    assert!(translate(&shallow).is_success());
}

#[test]
fn dangling_else_is_rejected() {
    let outcome = translate("if x greater than 5 then print x else");
    assert!(matches!(
        outcome.error(),
        Some(TranslateError::Generation { .. })
    ));
    assert!(translate("if x greater than 5 then print x else print y").is_success());
}
