//! CLI argument parsing via `clap`.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ruletest",
    version,
    about = "Run the test suites declared on lint rules",
    long_about = "Ruletest — load lint rules, plugins or configuration lists, run the valid/invalid cases declared on every rule, and report pass/fail/skip.\n\nConfiguration precedence: CLI > ruletest.toml > defaults.",
    after_help = "Examples:\n  ruletest rules/no-debugger.json\n  ruletest 'plugins/*.yaml' --bail\n  ruletest eslint.config.json --silent\n\nExit status is 0 for a clean run, the number of failed plus skipped cases otherwise, and 255 when no rule declared any case."
)]
/// Top-level CLI options.
pub struct Cli {
    /// Rule, plugin or configuration files (globs allowed)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Stop at the first failing case")]
    pub bail: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Only print failures")]
    pub silent: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable colored output")]
    pub no_color: bool,
    #[arg(long, help = "Project root (default: current dir)")]
    pub root: Option<String>,
}

impl Cli {
    /// Flags only override config when set.
    pub fn bail_flag(&self) -> Option<bool> {
        self.bail.then_some(true)
    }

    pub fn silent_flag(&self) -> Option<bool> {
        self.silent.then_some(true)
    }

    pub fn color_flag(&self) -> Option<bool> {
        self.no_color.then_some(false)
    }
}

/// Map the run status to a process exit code.
///
/// `-1` (no rule had any case) is a failure; counts saturate at 255.
pub fn exit_code(status: i32) -> i32 {
    if status < 0 {
        255
    } else {
        status.min(255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_files_and_flags() {
        let cli = Cli::parse_from(["ruletest", "a.json", "b/*.yaml", "--bail", "--no-color"]);
        assert_eq!(cli.files, vec!["a.json", "b/*.yaml"]);
        assert_eq!(cli.bail_flag(), Some(true));
        assert_eq!(cli.silent_flag(), None);
        assert_eq!(cli.color_flag(), Some(false));
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code(0), 0);
        assert_eq!(exit_code(-1), 255);
        assert_eq!(exit_code(7), 7);
        assert_eq!(exit_code(4000), 255);
    }
}
