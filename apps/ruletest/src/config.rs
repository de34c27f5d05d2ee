//! Configuration discovery and effective settings resolution.
//!
//! Ruletest reads `ruletest.toml|yaml|yml` from the start directory (or the
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `files`: none (inputs must come from the CLI or the config)
//! - `bail`: false
//! - `silent`: false
//! - `color`: true unless `NO_COLOR` is set
//! - `language_options`: `{ ecmaVersion = "latest", sourceType = "module" }`
//!
//! Overrides precedence: CLI > config file > defaults.
//! CLI inputs are relative to the working directory; inputs listed in the
//! config file are relative to the directory holding it.

use crate::models::ExecutionConfig;
use serde::Deserialize;
use serde_json::Value as Json;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["ruletest.toml", "ruletest.yaml", "ruletest.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `ruletest.toml|yaml`.
pub struct RuletestConfig {
    /// Inputs used when none are passed on the command line.
    pub files: Option<Vec<String>>,
    pub bail: Option<bool>,
    pub silent: Option<bool>,
    pub color: Option<bool>,
    /// Replaces the baseline `languageOptions` for rules without config.
    pub language_options: Option<Json>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the binary after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    pub files: Vec<String>,
    /// Directory `files` are relative to: the working directory for CLI
    /// inputs, `root` for inputs taken from the config file.
    pub base: PathBuf,
    pub bail: bool,
    pub silent: bool,
    pub color: bool,
    pub baseline: ExecutionConfig,
}

/// Walk upward from `start` to detect the project root.
///
/// Stops when a `ruletest.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `RuletestConfig` from the first config file present in `root`.
///
/// An unreadable or invalid file is reported at warn level and treated as
/// absent.
pub fn load_config(root: &Path) -> Option<RuletestConfig> {
    let path = CONFIG_FILES
        .iter()
        .map(|f| root.join(f))
        .find(|p| p.exists())?;
    let text = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read config");
            return None;
        }
    };
    let parsed = if path.extension().is_some_and(|e| e == "toml") {
        toml::from_str::<RuletestConfig>(&text).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str::<RuletestConfig>(&text).map_err(|e| e.to_string())
    };
    match parsed {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
            None
        }
    }
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_root: Option<&str>,
    cli_files: &[String],
    cli_bail: Option<bool>,
    cli_silent: Option<bool>,
    cli_color: Option<bool>,
) -> Effective {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_effective_in(&cwd, cli_root, cli_files, cli_bail, cli_silent, cli_color)
}

/// Same as [`resolve_effective`] with an explicit working directory.
///
/// A relative `cli_root` is taken from `cwd`, so the upward walk always has
/// real ancestors to visit.
pub fn resolve_effective_in(
    cwd: &Path,
    cli_root: Option<&str>,
    cli_files: &[String],
    cli_bail: Option<bool>,
    cli_silent: Option<bool>,
    cli_color: Option<bool>,
) -> Effective {
    let start: PathBuf = match cli_root {
        Some(r) => cwd.join(r).components().collect(),
        None => cwd.to_path_buf(),
    };
    let root = detect_root(&start);
    let cfg = load_config(&root).unwrap_or_default();

    let (files, base) = if cli_files.is_empty() {
        (cfg.files.unwrap_or_default(), root.clone())
    } else {
        (cli_files.to_vec(), cwd.to_path_buf())
    };
    let bail = cli_bail.or(cfg.bail).unwrap_or(false);
    let silent = cli_silent.or(cfg.silent).unwrap_or(false);
    let color = cli_color
        .or(cfg.color)
        .unwrap_or_else(crate::utils::default_color);

    Effective {
        root,
        files,
        base,
        bail,
        silent,
        color,
        baseline: ExecutionConfig::baseline(cfg.language_options),
    }
}
