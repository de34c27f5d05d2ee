//! Shared data models: test cases, rule modules, manifests and run statistics.

pub mod case;
pub mod manifest;
pub mod rule;

pub use case::{CaseInput, Expected, ExpectedDiagnostic, TestCase, Tests};
pub use rule::{
    Diagnostic, ExecutionConfig, Loaded, Plugin, RuleContext, RuleEntry, RuleLogic, RuleModule,
    SourceArtifact,
};

use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
/// Pass/fail/skip counters for one invocation.
pub struct RunStats {
    pub pass: usize,
    pub fail: usize,
    pub skip: usize,
}

impl RunStats {
    /// `-1` when nothing ran anywhere, otherwise `fail + skip`.
    pub fn status_code(&self) -> i32 {
        if self.pass == 0 && self.fail == 0 && self.skip == 0 {
            return -1;
        }
        i32::try_from(self.fail + self.skip).unwrap_or(i32::MAX)
    }
}
