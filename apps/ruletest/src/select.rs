//! Selection: exclusive mode across the whole run, and the `only` helper.
//!
//! One `only: true` case anywhere switches every rule to running its marked
//! cases only. Rules without marks end up with an empty selection.

use crate::models::{CaseInput, RuleEntry, TestCase, Tests};

/// A rule entry with its total and selected cases.
#[derive(Debug, Clone)]
pub struct PlannedRule {
    pub entry: RuleEntry,
    pub total: Vec<TestCase>,
    pub selected: Vec<TestCase>,
}

impl PlannedRule {
    pub fn skipped(&self) -> usize {
        self.total.len() - self.selected.len()
    }
}

/// True when any case of any rule is marked `only: true`.
pub fn exclusive_mode(entries: &[RuleEntry]) -> bool {
    entries
        .iter()
        .any(|e| e.module.tests.as_ref().is_some_and(Tests::has_only))
}

/// Compute each rule's total and selected cases, keeping entry order.
pub fn plan(entries: Vec<RuleEntry>) -> Vec<PlannedRule> {
    let exclusive = exclusive_mode(&entries);
    if exclusive {
        tracing::debug!("exclusive mode: running only marked cases");
    }
    entries
        .into_iter()
        .map(|entry| {
            let total = entry
                .module
                .tests
                .as_ref()
                .map(Tests::total_cases)
                .unwrap_or_default();
            let selected = total
                .iter()
                .filter(|c| !exclusive || c.is_only())
                .cloned()
                .collect();
            PlannedRule {
                entry,
                total,
                selected,
            }
        })
        .collect()
}

/// Values that can be marked exclusive with [`only`].
pub trait Only {
    type Output;
    fn only(self) -> Self::Output;
}

/// Mark a case, a list of cases, or a whole `tests` value as exclusive.
///
/// An explicit `only: false` on a case is left as is. Applying it twice is
/// the same as applying it once.
pub fn only<T: Only>(input: T) -> T::Output {
    input.only()
}

impl Only for &str {
    type Output = TestCase;
    fn only(self) -> TestCase {
        TestCase::new(self).only()
    }
}

impl Only for String {
    type Output = TestCase;
    fn only(self) -> TestCase {
        TestCase::new(self).only()
    }
}

impl Only for TestCase {
    type Output = TestCase;
    fn only(self) -> TestCase {
        TestCase {
            only: self.only.or(Some(true)),
            ..self
        }
    }
}

impl Only for CaseInput {
    type Output = CaseInput;
    fn only(self) -> CaseInput {
        match self {
            CaseInput::Code(code) => CaseInput::Case(code.only()),
            CaseInput::Case(case) => CaseInput::Case(case.only()),
        }
    }
}

impl<T: Only> Only for Vec<T> {
    type Output = Vec<T::Output>;
    fn only(self) -> Self::Output {
        self.into_iter().map(Only::only).collect()
    }
}

impl Only for Tests {
    type Output = Tests;
    fn only(self) -> Tests {
        Tests {
            valid: self.valid.only(),
            invalid: self.invalid.only(),
        }
    }
}

impl<T: Only> Only for Option<T> {
    type Output = Option<T::Output>;
    fn only(self) -> Self::Output {
        self.map(Only::only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnostic, ExecutionConfig, Expected, RuleContext, RuleModule};
    use std::sync::Arc;

    fn noop(_: &RuleContext<'_>) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn entry(name: &str, tests: Tests) -> RuleEntry {
        RuleEntry {
            name: name.into(),
            module: RuleModule::new(noop).with_tests(tests),
            config: Arc::new(ExecutionConfig::default()),
        }
    }

    #[test]
    fn test_only_marks_strings_cases_and_lists() {
        assert_eq!(only("x"), TestCase { only: Some(true), ..TestCase::new("x") });
        let explicit_off = TestCase { only: Some(false), ..TestCase::new("y") };
        assert_eq!(only(explicit_off.clone()), explicit_off);
        let list = only(vec![CaseInput::from("a"), CaseInput::from(TestCase::new("b"))]);
        assert!(list.iter().all(|c| matches!(c, CaseInput::Case(t) if t.is_only())));
    }

    #[test]
    fn test_only_is_idempotent() {
        let once = only(TestCase::new("x"));
        assert_eq!(only(once.clone()), once);
        let tests = Tests {
            valid: vec!["a".into()],
            invalid: vec![TestCase::new("b").with_errors(Expected::Count(1))],
        };
        let once = only(tests);
        assert_eq!(only(once.clone()), once);
        assert!(once.total_cases().iter().all(TestCase::is_only));
    }

    #[test]
    fn test_only_passes_none_through() {
        let none: Option<Tests> = None;
        assert_eq!(only(none), None);
    }

    #[test]
    fn test_full_run_selects_everything() {
        let planned = plan(vec![entry(
            "foo",
            Tests {
                valid: vec!["".into(), "a".into()],
                invalid: vec![],
            },
        )]);
        assert_eq!(planned[0].total.len(), 2);
        assert_eq!(planned[0].selected.len(), 2);
        assert_eq!(planned[0].skipped(), 0);
    }

    #[test]
    fn test_exclusive_mode_is_global() {
        let marked = Tests {
            valid: vec![only("").into(), "void(0)".into()],
            invalid: vec![],
        };
        let bystander = Tests {
            valid: vec!["".into()],
            invalid: vec![TestCase::new("x").with_errors(Expected::Count(1))],
        };
        let planned = plan(vec![entry("a", marked), entry("b", bystander), entry("c", Tests::default())]);
        assert_eq!(planned[0].selected.len(), 1);
        assert!(planned[0].selected[0].is_only());
        assert!(planned[1].selected.is_empty());
        assert_eq!(planned[1].skipped(), 2);
        let skip: usize = planned.iter().map(PlannedRule::skipped).sum();
        assert_eq!(skip, 3);
    }

    #[test]
    fn test_bare_string_never_triggers_exclusive_mode() {
        let tests = Tests {
            valid: vec!["only".into()],
            invalid: vec![],
        };
        assert!(!exclusive_mode(&[entry("a", tests)]));
    }
}
