//! Rule-testing engine boundary and the built-in diagnostic engine.
//!
//! The harness only knows [`RuleTester`]: run one rule against a set of
//! cases and either return or fail. [`LintTester`] is the engine the CLI
//! uses; it runs a rule's logic and compares found diagnostics against the
//! expectations of each case.

use crate::models::{
    Diagnostic, ExecutionConfig, Expected, ExpectedDiagnostic, RuleContext, RuleModule, TestCase,
};
use serde_json::{json, Map, Value as Json};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Cases handed to an engine, already partitioned.
#[derive(Debug, Clone, Default)]
pub struct CaseSet {
    pub valid: Vec<TestCase>,
    pub invalid: Vec<TestCase>,
}

/// Why an engine run failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineFailure {
    /// Found diagnostics did not match the expectation.
    #[error("{message}")]
    Assertion { message: String },
    /// Anything else that went wrong while running the case.
    #[error("{message}")]
    Unexpected {
        message: String,
        stack: Option<String>,
    },
}

impl EngineFailure {
    pub fn assertion(message: impl Into<String>) -> Self {
        EngineFailure::Assertion {
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        EngineFailure::Unexpected {
            message: message.into(),
            stack: None,
        }
    }

    /// Text shown in the report: assertion message, or the fullest detail
    /// available for anything else.
    pub fn render(&self) -> String {
        match self {
            EngineFailure::Assertion { message } => message.clone(),
            EngineFailure::Unexpected { message, stack } => {
                stack.clone().unwrap_or_else(|| message.clone())
            }
        }
    }

    /// Convert a caught panic payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panicked with a non-string payload".to_string()
        };
        EngineFailure::unexpected(message)
    }
}

/// External rule-testing engine.
pub trait RuleTester {
    fn run(
        &self,
        rule_name: &str,
        module: &RuleModule,
        cases: &CaseSet,
        config: &ExecutionConfig,
    ) -> Result<(), EngineFailure>;
}

/// Built-in engine: runs rule logic in-process and compares diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LintTester;

impl RuleTester for LintTester {
    fn run(
        &self,
        rule_name: &str,
        module: &RuleModule,
        cases: &CaseSet,
        _config: &ExecutionConfig,
    ) -> Result<(), EngineFailure> {
        let rule_id = format!("rule-to-test/{}", rule_name);
        for case in &cases.valid {
            let found = lint(module, case)?;
            if !found.is_empty() {
                return Err(EngineFailure::assertion(format!(
                    "Should have no errors but had {}: {}",
                    found.len(),
                    render_found(&rule_id, &found)
                )));
            }
        }
        for case in &cases.invalid {
            let expected = match &case.errors {
                Some(e) if !e.is_empty() => e,
                _ => {
                    return Err(EngineFailure::unexpected(
                        "Invalid cases must have at least one error",
                    ))
                }
            };
            let found = lint(module, case)?;
            if found.len() != expected.len() {
                return Err(EngineFailure::assertion(format!(
                    "Should have {} {} but had {}: {}",
                    expected.len(),
                    if expected.len() == 1 { "error" } else { "errors" },
                    found.len(),
                    render_found(&rule_id, &found)
                )));
            }
            if let Expected::List(items) = expected {
                for (index, (want, got)) in items.iter().zip(&found).enumerate() {
                    compare(index, want, got)?;
                }
            }
        }
        Ok(())
    }
}

/// Run the rule's logic on one case, turning a panic into a failure.
fn lint(module: &RuleModule, case: &TestCase) -> Result<Vec<Diagnostic>, EngineFailure> {
    let cx = RuleContext {
        code: &case.code,
        filename: case.filename.as_deref(),
        options: case.options.as_ref(),
    };
    panic::catch_unwind(AssertUnwindSafe(|| module.logic.check(&cx)))
        .map_err(EngineFailure::from_panic)
}

fn compare(index: usize, want: &ExpectedDiagnostic, got: &Diagnostic) -> Result<(), EngineFailure> {
    let n = index + 1;
    if let Some(message) = &want.message {
        if *message != got.message {
            return Err(EngineFailure::assertion(format!(
                "Error {} should have message {:?} but had {:?}",
                n, message, got.message
            )));
        }
    }
    if let Some(id) = &want.message_id {
        if Some(id) != got.message_id.as_ref() {
            return Err(EngineFailure::assertion(format!(
                "Error {} should have messageId {:?} but had {:?}",
                n, id, got.message_id
            )));
        }
    }
    let positions = [
        ("line", want.line, Some(got.line)),
        ("column", want.column, Some(got.column)),
        ("endLine", want.end_line, got.end_line),
        ("endColumn", want.end_column, got.end_column),
    ];
    for (field, expected, actual) in positions {
        if let Some(expected) = expected {
            if Some(expected) != actual {
                let actual = actual.map(|a| a.to_string()).unwrap_or_else(|| "none".into());
                return Err(EngineFailure::assertion(format!(
                    "Error {} should have {} {} but had {}",
                    n, field, expected, actual
                )));
            }
        }
    }
    Ok(())
}

/// Pretty JSON of found diagnostics, each tagged with the rule id and severity.
fn render_found(rule_id: &str, found: &[Diagnostic]) -> String {
    let items: Vec<Json> = found
        .iter()
        .map(|d| {
            let mut item = Map::new();
            item.insert("ruleId".into(), json!(rule_id));
            item.insert("severity".into(), json!(1));
            if let Ok(Json::Object(fields)) = serde_json::to_value(d) {
                item.extend(fields);
            }
            Json::Object(item)
        })
        .collect();
    serde_json::to_string_pretty(&items).unwrap_or_else(|_| format!("{:?}", found))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reports "bar" on any non-blank program.
    fn bar_rule() -> RuleModule {
        RuleModule::new(|cx: &RuleContext<'_>| {
            if cx.code.trim().is_empty() {
                Vec::new()
            } else {
                vec![Diagnostic::at("bar", 1, 1)]
            }
        })
    }

    fn run(valid: Vec<TestCase>, invalid: Vec<TestCase>) -> Result<(), EngineFailure> {
        LintTester.run(
            "foo",
            &bar_rule(),
            &CaseSet { valid, invalid },
            &ExecutionConfig::baseline(None),
        )
    }

    #[test]
    fn test_passing_valid_and_invalid() {
        let invalid = TestCase::new("void(0)")
            .with_errors(Expected::List(vec![ExpectedDiagnostic::message("bar")]));
        assert_eq!(run(vec![TestCase::new("")], vec![invalid]), Ok(()));
    }

    #[test]
    fn test_valid_case_with_diagnostics_fails() {
        let err = run(vec![TestCase::new("void(0)")], vec![]).unwrap_err();
        assert!(matches!(err, EngineFailure::Assertion { .. }));
        let text = err.render();
        assert!(text.starts_with("Should have no errors but had 1: ["));
        assert!(text.contains("\"ruleId\": \"rule-to-test/foo\""));
    }

    #[test]
    fn test_invalid_count_mismatch() {
        let invalid = TestCase::new("").with_errors(Expected::Count(1));
        let err = run(vec![], vec![invalid]).unwrap_err();
        assert_eq!(err.render(), "Should have 1 error but had 0: []");
    }

    #[test]
    fn test_message_and_position_mismatch() {
        let wrong_message = TestCase::new("x")
            .with_errors(Expected::List(vec![ExpectedDiagnostic::message("baz")]));
        let err = run(vec![], vec![wrong_message]).unwrap_err();
        assert_eq!(err.render(), "Error 1 should have message \"baz\" but had \"bar\"");

        let wrong_line = TestCase::new("x").with_errors(Expected::List(vec![ExpectedDiagnostic {
            line: Some(2),
            ..ExpectedDiagnostic::default()
        }]));
        let err = run(vec![], vec![wrong_line]).unwrap_err();
        assert_eq!(err.render(), "Error 1 should have line 2 but had 1");
    }

    #[test]
    fn test_invalid_without_errors_is_unexpected() {
        let invalid = TestCase::new("x").with_errors(Expected::Count(0));
        let err = run(vec![], vec![invalid]).unwrap_err();
        assert!(matches!(err, EngineFailure::Unexpected { .. }));
    }

    #[test]
    fn test_panicking_rule_becomes_unexpected_failure() {
        let module = RuleModule::new(|_: &RuleContext<'_>| -> Vec<Diagnostic> { panic!("boom") });
        let err = LintTester
            .run(
                "p",
                &module,
                &CaseSet {
                    valid: vec![TestCase::new("")],
                    invalid: vec![],
                },
                &ExecutionConfig::default(),
            )
            .unwrap_err();
        assert_eq!(err, EngineFailure::unexpected("boom"));
    }

    #[test]
    fn test_render_prefers_stack_for_unexpected() {
        let failure = EngineFailure::Unexpected {
            message: "m".into(),
            stack: Some("m\n    at x".into()),
        };
        assert_eq!(failure.render(), "m\n    at x");
        assert_eq!(EngineFailure::assertion("a").render(), "a");
    }

    #[test]
    fn test_render_found_tags_serialized_diagnostics() {
        let found = vec![Diagnostic {
            message_id: Some("noBar".into()),
            ..Diagnostic::at("bar", 2, 3).ending_at(2, 6)
        }];
        let rendered: Json = serde_json::from_str(&render_found("rule-to-test/foo", &found)).unwrap();
        assert_eq!(
            rendered,
            json!([{
                "ruleId": "rule-to-test/foo",
                "severity": 1,
                "message": "bar",
                "messageId": "noBar",
                "line": 2,
                "column": 3,
                "endLine": 2,
                "endColumn": 6,
            }])
        );
        let keys: Vec<_> = rendered[0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys[..3], ["ruleId", "severity", "message"]);
    }
}
