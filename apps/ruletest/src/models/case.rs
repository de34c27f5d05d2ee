//! Test case schema shared by rule modules, manifests and engines.
//!
//! A case is either `valid` (no `errors` field) or `invalid` (an `errors`
//! count or list of expected diagnostics). The `only` flag is transient: the
//! selection pass reads it and the runner strips it before an engine sees
//! the case.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// One source snippet plus its expectations.
pub struct TestCase {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Json>,
    /// Present means invalid, even when the value is `null`.
    #[serde(
        default,
        deserialize_with = "present_errors",
        skip_serializing_if = "Option::is_none"
    )]
    pub errors: Option<Expected>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only: Option<bool>,
    /// Engine-specific fields (`output`, `settings`, ...) passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

impl TestCase {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn with_errors(mut self, errors: Expected) -> Self {
        self.errors = Some(errors);
        self
    }

    /// True only for an explicit `only: true`.
    pub fn is_only(&self) -> bool {
        self.only == Some(true)
    }

    pub fn is_invalid(&self) -> bool {
        self.errors.is_some()
    }

    /// Copy of the case with the selection marker removed.
    pub fn without_only(&self) -> Self {
        Self {
            only: None,
            ..self.clone()
        }
    }
}

/// An `errors` key with a `null` value becomes an empty expectation, which
/// the engine rejects.
fn present_errors<'de, D>(deserializer: D) -> Result<Option<Expected>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Expected>::deserialize(deserializer).map(|e| Some(e.unwrap_or(Expected::Count(0))))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Expected diagnostics of an invalid case.
pub enum Expected {
    Count(usize),
    List(Vec<ExpectedDiagnostic>),
}

impl Expected {
    pub fn len(&self) -> usize {
        match self {
            Expected::Count(n) => *n,
            Expected::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedDiagnostic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

impl ExpectedDiagnostic {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Entry of a `valid` list: a bare string is shorthand for `{ code }`.
pub enum CaseInput {
    Code(String),
    Case(TestCase),
}

impl CaseInput {
    pub fn to_case(&self) -> TestCase {
        match self {
            CaseInput::Code(code) => TestCase::new(code.clone()),
            CaseInput::Case(case) => case.clone(),
        }
    }
}

impl From<&str> for CaseInput {
    fn from(code: &str) -> Self {
        CaseInput::Code(code.to_string())
    }
}

impl From<TestCase> for CaseInput {
    fn from(case: TestCase) -> Self {
        CaseInput::Case(case)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// The `tests` attribute of a rule module.
pub struct Tests {
    #[serde(default)]
    pub valid: Vec<CaseInput>,
    #[serde(default)]
    pub invalid: Vec<TestCase>,
}

impl Tests {
    /// All cases in declaration order: `valid` first, then `invalid`.
    pub fn total_cases(&self) -> Vec<TestCase> {
        self.valid
            .iter()
            .map(CaseInput::to_case)
            .chain(self.invalid.iter().cloned())
            .collect()
    }

    pub fn has_only(&self) -> bool {
        self.valid
            .iter()
            .any(|c| matches!(c, CaseInput::Case(case) if case.is_only()))
            || self.invalid.iter().any(TestCase::is_only)
    }
}
