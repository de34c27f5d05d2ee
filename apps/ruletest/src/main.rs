//! Ruletest CLI binary entry point.
//! Resolves config, loads the given files and runs their rule tests.

use clap::Parser;
use ruletest::cli::{exit_code, Cli};
use ruletest::utils::{error_prefix, note_prefix, Style};
use ruletest::{config, loader, LintTester, RunOptions};

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let eff = config::resolve_effective(
        cli.root.as_deref(),
        &cli.files,
        cli.bail_flag(),
        cli.silent_flag(),
        cli.color_flag(),
    );
    if cli.files.is_empty() && !eff.files.is_empty() {
        eprintln!("{} using files from ruletest config", note_prefix());
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| eff.root.clone());
    let artifacts = loader::expand_inputs(&eff.base, &eff.files)
        .and_then(|paths| loader::load_files(&paths, &cwd));
    let artifacts = match artifacts {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    };

    let silent = eff.silent;
    let mut opts = RunOptions {
        bail: eff.bail,
        log: Box::new(move |line| {
            if !silent {
                println!("{}", line);
            }
        }),
        err: Box::new(|line| println!("{}", line)),
        style: Style::new(eff.color),
        baseline: eff.baseline.clone(),
    };

    match ruletest::run(&artifacts, &LintTester, &mut opts) {
        Ok(status) => std::process::exit(exit_code(status)),
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    }
}
