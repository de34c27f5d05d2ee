//! Case-by-case execution of a planned rule.
//!
//! Every selected case runs in its own engine invocation so one failing case
//! cannot hide diagnostics of its siblings. Panics escaping the engine are
//! recorded like any other failure.

use crate::engine::{CaseSet, EngineFailure, RuleTester};
use crate::models::{ExecutionConfig, TestCase};
use crate::select::PlannedRule;
use std::panic::{self, AssertUnwindSafe};

/// A failed case with its rendered error.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub case: TestCase,
    pub error: String,
}

/// Run the selected cases of one rule. With `bail`, stops at the first failure.
pub fn run_rule(
    tester: &dyn RuleTester,
    planned: &PlannedRule,
    baseline: &ExecutionConfig,
    bail: bool,
) -> Vec<Failure> {
    let entry = &planned.entry;
    let config = if entry.config.is_empty() {
        baseline
    } else {
        entry.config.as_ref()
    };
    let mut failures = Vec::new();
    for selected in &planned.selected {
        let case = selected.without_only();
        let cases = if case.is_invalid() {
            CaseSet {
                valid: Vec::new(),
                invalid: vec![case.clone()],
            }
        } else {
            CaseSet {
                valid: vec![case.clone()],
                invalid: Vec::new(),
            }
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            tester.run(&entry.name, &entry.module, &cases, config)
        }))
        .unwrap_or_else(|payload| Err(EngineFailure::from_panic(payload)));
        match outcome {
            Ok(()) => tracing::trace!(rule = %entry.name, code = %case.code, "case passed"),
            Err(failure) => {
                tracing::debug!(rule = %entry.name, code = %case.code, "case failed");
                failures.push(Failure {
                    case,
                    error: failure.render(),
                });
                if bail {
                    break;
                }
            }
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnostic, Expected, RuleContext, RuleEntry, RuleModule, Tests};
    use crate::select::only;
    use std::cell::RefCell;
    use std::sync::Arc;

    /// Records every invocation; fails on code "fail", panics on "panic".
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(usize, usize, Option<bool>, bool)>>,
    }

    impl RuleTester for Recorder {
        fn run(
            &self,
            _rule_name: &str,
            _module: &RuleModule,
            cases: &CaseSet,
            config: &ExecutionConfig,
        ) -> Result<(), EngineFailure> {
            let case = cases.valid.iter().chain(&cases.invalid).next().unwrap();
            self.calls.borrow_mut().push((
                cases.valid.len(),
                cases.invalid.len(),
                case.only,
                config.settings.contains_key("languageOptions"),
            ));
            match case.code.as_str() {
                "fail" => Err(EngineFailure::assertion("nope")),
                "panic" => panic!("engine blew up"),
                _ => Ok(()),
            }
        }
    }

    fn noop(_: &RuleContext<'_>) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn planned(tests: Tests) -> PlannedRule {
        let total = tests.total_cases();
        PlannedRule {
            entry: RuleEntry {
                name: "foo".into(),
                module: RuleModule::new(noop).with_tests(tests),
                config: Arc::new(ExecutionConfig::default()),
            },
            selected: total.clone(),
            total,
        }
    }

    #[test]
    fn test_each_case_runs_alone_classified_and_stripped() {
        let tests = Tests {
            valid: vec![only("a").into(), "b".into()],
            invalid: vec![TestCase::new("c").with_errors(Expected::Count(1))],
        };
        let recorder = Recorder::default();
        let failures = run_rule(&recorder, &planned(tests), &ExecutionConfig::baseline(None), false);
        assert!(failures.is_empty());
        assert_eq!(
            *recorder.calls.borrow(),
            vec![(1, 0, None, true), (1, 0, None, true), (0, 1, None, true)]
        );
    }

    #[test]
    fn test_failures_are_collected_and_loop_continues() {
        let tests = Tests {
            valid: vec!["fail".into(), "ok".into(), "panic".into()],
            invalid: vec![],
        };
        let recorder = Recorder::default();
        let failures = run_rule(&recorder, &planned(tests), &ExecutionConfig::default(), false);
        assert_eq!(recorder.calls.borrow().len(), 3);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].error, "nope");
        assert_eq!(failures[0].case, TestCase::new("fail"));
        assert_eq!(failures[1].error, "engine blew up");
    }

    #[test]
    fn test_bail_stops_after_first_failure() {
        let tests = Tests {
            valid: vec!["fail".into(), "fail".into()],
            invalid: vec![],
        };
        let recorder = Recorder::default();
        let failures = run_rule(&recorder, &planned(tests), &ExecutionConfig::default(), true);
        assert_eq!(failures.len(), 1);
        assert_eq!(recorder.calls.borrow().len(), 1);
    }

    #[test]
    fn test_entry_config_wins_over_baseline() {
        let mut rule = planned(Tests {
            valid: vec!["ok".into()],
            invalid: vec![],
        });
        let mut config = ExecutionConfig::default();
        config.language = Some("md/commonmark".into());
        rule.entry.config = Arc::new(config);
        let recorder = Recorder::default();
        run_rule(&recorder, &rule, &ExecutionConfig::baseline(None), false);
        assert!(!recorder.calls.borrow()[0].3);
    }
}
