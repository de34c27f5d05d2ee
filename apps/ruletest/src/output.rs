//! Report rendering and run aggregation.
//!
//! Rules are reordered so that rules without cases come first, then rules
//! whose cases are all skipped, then everything else in original order. Each
//! rule gets one status line; failures add detail blocks on the `err` sink.
//! The run ends with a summary and an integer status.

use crate::engine::RuleTester;
use crate::models::{ExecutionConfig, RunStats};
use crate::runner::{run_rule, Failure};
use crate::select::PlannedRule;
use crate::utils::{group_thousands, indent_lines, Badge, Style};

/// Line sinks and switches consumed by the reporter.
pub struct RunOptions<'a> {
    pub bail: bool,
    pub log: Box<dyn FnMut(&str) + 'a>,
    pub err: Box<dyn FnMut(&str) + 'a>,
    pub style: Style,
    /// Config used for rules that carry none of their own.
    pub baseline: ExecutionConfig,
}

impl Default for RunOptions<'_> {
    fn default() -> Self {
        Self {
            bail: false,
            log: Box::new(|line| println!("{}", line)),
            err: Box::new(|line| println!("{}", line)),
            style: Style::default(),
            baseline: ExecutionConfig::baseline(None),
        }
    }
}

/// Stable reorder: zero-case rules, then fully skipped rules, then the rest.
pub fn order_for_report(plan: &mut [PlannedRule]) {
    plan.sort_by_key(|rule| {
        if rule.total.is_empty() {
            0
        } else if rule.selected.is_empty() {
            1
        } else {
            2
        }
    });
}

/// Execute and report every planned rule, returning the status code.
///
/// The status is `-1` when no rule had any case, `fail + skip` otherwise,
/// and `1` as soon as a failure is reported in bail mode.
pub fn report(mut plan: Vec<PlannedRule>, tester: &dyn RuleTester, opts: &mut RunOptions<'_>) -> i32 {
    order_for_report(&mut plan);
    let style = opts.style;
    let mut stats = RunStats::default();

    for rule in &plan {
        let name = &rule.entry.name;
        let total = rule.total.len();
        let selected = rule.selected.len();

        if total == 0 {
            (opts.log)(&format!("⚪ {} (0)", name));
            continue;
        }

        stats.skip += rule.skipped();

        if selected == 0 {
            (opts.log)(&format!("⏩ {} ({})", name, group_thousands(total)));
            continue;
        }

        let failures = run_rule(tester, rule, &opts.baseline, opts.bail);

        if !failures.is_empty() {
            (opts.err)(&format!(
                "🔴 {} ({}/{})",
                name,
                group_thousands(failures.len()),
                group_thousands(total)
            ));
            for failure in &failures {
                (opts.err)("");
                for line in failure_block(&style, failure) {
                    (opts.err)(&line);
                }
                if opts.bail {
                    return 1;
                }
            }
            (opts.log)("");
        } else if total == selected {
            (opts.log)(&format!("🟢 {} ({})", name, group_thousands(total)));
        } else {
            (opts.log)(&format!(
                "🟡 {} ({}/{})",
                name,
                group_thousands(selected),
                group_thousands(total)
            ));
        }

        stats.pass += selected - failures.len();
        stats.fail += failures.len();
    }

    for line in summary_lines(&style, &stats) {
        (opts.log)(&line);
    }

    stats.status_code()
}

/// Detail lines for one failed case: name, numbered code, filename, options,
/// then the error text.
pub fn failure_block(style: &Style, failure: &Failure) -> Vec<String> {
    let case = &failure.case;
    let mut lines = Vec::new();
    if let Some(name) = &case.name {
        lines.push(format!("   {}: {}", style.underline("name"), name));
    }
    lines.push(format!(
        "   {}: {}",
        style.underline("code"),
        indent_lines(style, 9, &case.code, true).trim_start()
    ));
    if let Some(filename) = &case.filename {
        lines.push(format!("   {}: {}", style.underline("filename"), filename));
    }
    if let Some(options) = &case.options {
        let pretty = serde_json::to_string_pretty(options).unwrap_or_else(|_| options.to_string());
        lines.push(format!(
            "   {}: {}",
            style.underline("options"),
            indent_lines(style, 3, &pretty, false).trim_start()
        ));
    }
    lines.push(style.red(&indent_lines(style, 3, &failure.error, false)));
    lines
}

/// Blank separator, then SKIP (if any), PASS, FAIL (if any).
pub fn summary_lines(style: &Style, stats: &RunStats) -> Vec<String> {
    let mut lines = vec![String::new()];
    if stats.skip > 0 {
        lines.push(format!("{} {}", style.badge("SKIP", Badge::Skip), group_thousands(stats.skip)));
    }
    lines.push(format!("{} {}", style.badge("PASS", Badge::Pass), group_thousands(stats.pass)));
    if stats.fail > 0 {
        lines.push(format!("{} {}", style.badge("FAIL", Badge::Fail), group_thousands(stats.fail)));
    }
    lines
}
