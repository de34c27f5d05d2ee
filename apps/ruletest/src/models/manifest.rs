//! Manifest schema for declarative rules loaded from JSON/YAML/TOML files.
//!
//! Any object carrying a `create` table is a rule, unless its `rules` table
//! holds only rules. The `create` table selects one of the built-in check
//! kinds; `meta` and `tests` sit beside it:
//!
//! ```toml
//! [create]
//! kind = "pattern"
//! regex = "debugger"
//! message = "Unexpected debugger statement"
//!
//! [tests]
//! valid = ["let a = 1"]
//! invalid = [{ code = "debugger", errors = 1 }]
//! ```

use super::case::Tests;
use serde::Deserialize;
use serde_json::Value as Json;

#[derive(Deserialize)]
/// One rule as written in a manifest file.
pub struct RuleManifest {
    pub create: CreateSpec,
    #[serde(default)]
    pub meta: Json,
    #[serde(default)]
    pub tests: Option<Tests>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "kind")]
/// Built-in rule logic kinds.
pub enum CreateSpec {
    /// Report every match of `regex`.
    #[serde(rename = "pattern")]
    Pattern {
        regex: String,
        #[serde(default)]
        message: Option<String>,
    },
    /// Report once when a non-empty source never matches `regex`.
    #[serde(rename = "required")]
    Required {
        regex: String,
        #[serde(default)]
        message: Option<String>,
    },
    /// Report the first line past `max`.
    #[serde(rename = "maxLines")]
    MaxLines {
        max: usize,
        #[serde(default)]
        message: Option<String>,
    },
}
