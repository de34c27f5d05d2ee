//! Ruletest core library.
//!
//! Runs the test suites declared on lint rules and reports pass/fail/skip
//! with a single status code. The pipeline is:
//! `normalize` -> `select` -> `runner` (per rule, inside `output`) -> `output`.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `loader`: Reads rule/plugin/config manifests into loaded values.
//! - `normalize`: Classifies loaded values into namespaced rule entries.
//! - `select`: Exclusive mode and the `only` helper.
//! - `engine`: The rule-testing engine boundary and the built-in engine.
//! - `runner`: Runs one rule's selected cases in isolation.
//! - `output`: Ordering, report lines, summary and status code.
//! - `checks`: Built-in rule logic for declarative manifests.
//! - `models`: Test cases, rule modules, plugins and statistics.
//! - `utils`: Supporting helpers.
pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod output;
pub mod runner;
pub mod select;
pub mod utils;

pub use engine::{CaseSet, EngineFailure, LintTester, RuleTester};
pub use error::{Error, Result};
pub use output::RunOptions;
pub use select::only;

use models::SourceArtifact;

/// Normalize, select, execute and report. Returns the status code.
///
/// Only an artifact of unrecognized shape is an error; every test failure is
/// reported through the sinks and the returned code.
pub fn run(
    artifacts: &[SourceArtifact],
    tester: &dyn RuleTester,
    opts: &mut RunOptions<'_>,
) -> Result<i32> {
    let entries = normalize::normalize(artifacts)?;
    let plan = select::plan(entries);
    Ok(output::report(plan, tester, opts))
}
