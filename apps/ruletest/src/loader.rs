//! Loading of rule, plugin and configuration manifests.
//!
//! Inputs are paths or glob patterns. Files are parsed by extension
//! (`.json`, `.yaml|.yml`, `.toml`) and converted into [`Loaded`] values:
//! any object with a `create` table becomes a rule with compiled logic
//! (plugin-shaped objects excepted); other objects, arrays and scalars keep
//! their structure.

use crate::checks;
use crate::error::{Error, Result};
use crate::models::manifest::RuleManifest;
use crate::models::{Loaded, RuleModule, SourceArtifact};
use rayon::prelude::*;
use serde_json::{Map, Value as Json};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Expand inputs relative to `root`, in argument order, each file once.
///
/// A pattern that matches nothing is kept as a literal path so the read
/// error names it.
pub fn expand_inputs(root: &Path, inputs: &[String]) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Err(Error::NoInputs);
    }
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut paths = Vec::new();
    for input in inputs {
        let abs = root.join(input);
        let pattern = abs.to_string_lossy().to_string();
        let entries = glob::glob(&pattern).map_err(|source| Error::Glob {
            pattern: input.clone(),
            source,
        })?;
        let mut matched: Vec<PathBuf> = entries.flatten().filter(|p| p.is_file()).collect();
        if matched.is_empty() {
            matched.push(abs);
        }
        for path in matched {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }
    Ok(paths)
}

/// Load every file; parsing runs in parallel, results keep input order.
pub fn load_files(paths: &[PathBuf], display_root: &Path) -> Result<Vec<SourceArtifact>> {
    paths
        .par_iter()
        .map(|path| {
            let value = load_file(path)?;
            let shown = pathdiff::diff_paths(path, display_root).unwrap_or_else(|| path.clone());
            tracing::debug!(path = %shown.display(), "loaded manifest");
            Ok(SourceArtifact {
                source_path: shown.to_string_lossy().to_string(),
                value,
            })
        })
        .collect()
}

pub fn load_file(path: &Path) -> Result<Loaded> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let json = parse_document(path, &text)?;
    to_loaded(path, "$", json)
}

/// Parse a document into JSON according to the file extension.
pub fn parse_document(path: &Path, text: &str) -> Result<Json> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str::<Json>(text).map_err(|e| e.to_string()),
        "toml" => toml::from_str::<Json>(text).map_err(|e| e.to_string()),
        _ => serde_json::from_str::<Json>(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| Error::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Convert parsed JSON into a loaded value. `at` is the JSON path used in
/// error messages.
pub fn to_loaded(path: &Path, at: &str, json: Json) -> Result<Loaded> {
    match json {
        Json::Object(map) if map.contains_key("create") && !is_bundle(&map) => {
            let manifest: RuleManifest =
                serde_json::from_value(Json::Object(map)).map_err(|e| Error::InvalidRule {
                    path: path.to_path_buf(),
                    rule: at.to_string(),
                    message: e.to_string(),
                })?;
            let logic = checks::compile(&manifest.create).map_err(|e| Error::InvalidRule {
                path: path.to_path_buf(),
                rule: at.to_string(),
                message: e.to_string(),
            })?;
            let mut module = RuleModule::new(logic).with_meta(manifest.meta);
            module.tests = manifest.tests;
            Ok(Loaded::Rule(module))
        }
        Json::Object(map) => map
            .into_iter()
            .map(|(k, v)| {
                let child = format!("{}.{}", at, k);
                to_loaded(path, &child, v).map(|v| (k, v))
            })
            .collect::<Result<Vec<_>>>()
            .map(Loaded::Object),
        Json::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| to_loaded(path, &format!("{}[{}]", at, i), v))
            .collect::<Result<Vec<_>>>()
            .map(Loaded::List),
        scalar => Ok(Loaded::Data(scalar)),
    }
}

/// A `rules` table whose every value declares `create`. Such an object is a
/// plugin even when it carries its own `create`.
fn is_bundle(map: &Map<String, Json>) -> bool {
    match map.get("rules") {
        Some(Json::Object(rules)) => rules
            .values()
            .all(|r| r.as_object().is_some_and(|r| r.contains_key("create"))),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Expected;
    use tempfile::tempdir;

    #[test]
    fn test_rule_manifest_in_each_format() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("a.json"),
            r#"{ "create": { "kind": "pattern", "regex": "x" }, "tests": { "valid": ["y"] } }"#,
        )
        .unwrap();
        fs::write(
            root.join("b.yaml"),
            "create:\n  kind: maxLines\n  max: 1\ntests:\n  invalid:\n    - code: \"a\\nb\"\n      errors: 1\n",
        )
        .unwrap();
        fs::write(
            root.join("c.toml"),
            "[create]\nkind = \"required\"\nregex = \"^#\"\n",
        )
        .unwrap();
        for name in ["a.json", "b.yaml", "c.toml"] {
            let loaded = load_file(&root.join(name)).unwrap();
            assert!(loaded.as_rule().is_some(), "{} should load as a rule", name);
        }
        let b = load_file(&root.join("b.yaml")).unwrap();
        let tests = b.as_rule().unwrap().tests.clone().unwrap();
        assert_eq!(tests.invalid[0].code, "a\nb");
        assert_eq!(tests.invalid[0].errors, Some(Expected::Count(1)));
    }

    #[test]
    fn test_plugin_manifest_keeps_structure() {
        let json = serde_json::json!({
            "meta": { "name": "acme" },
            "rules": {
                "no-x": { "create": { "kind": "pattern", "regex": "x" } },
            }
        });
        let loaded = to_loaded(Path::new("p.json"), "$", json).unwrap();
        assert!(loaded
            .get("rules")
            .and_then(|r| r.get("no-x"))
            .and_then(|r| r.as_rule().cloned())
            .is_some());
        assert_eq!(
            loaded.get("meta").and_then(|m| m.to_json()),
            Some(serde_json::json!({ "name": "acme" }))
        );
    }

    #[test]
    fn test_bad_regex_names_rule_path() {
        let json = serde_json::json!({
            "rules": { "broken": { "create": { "kind": "pattern", "regex": "(" } } }
        });
        let err = to_loaded(Path::new("p.json"), "$", json).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("$.rules.broken"), "{}", text);
        assert!(text.contains("p.json"), "{}", text);
    }

    #[test]
    fn test_expand_inputs_globs_dedupes_and_keeps_missing() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("rules")).unwrap();
        fs::write(root.join("rules/b.json"), "{}").unwrap();
        fs::write(root.join("rules/a.json"), "{}").unwrap();
        let paths = expand_inputs(
            root,
            &[
                "rules/*.json".to_string(),
                "rules/a.json".to_string(),
                "missing.json".to_string(),
            ],
        )
        .unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["rules/a.json", "rules/b.json", "missing.json"]);
        assert!(matches!(expand_inputs(root, &[]), Err(Error::NoInputs)));
    }

    #[test]
    fn test_load_files_reports_relative_paths_in_order() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("z.json"), "[]").unwrap();
        fs::write(root.join("a.json"), "[]").unwrap();
        let artifacts = load_files(&[root.join("z.json"), root.join("a.json")], root).unwrap();
        let shown: Vec<_> = artifacts.iter().map(|a| a.source_path.as_str()).collect();
        assert_eq!(shown, vec!["z.json", "a.json"]);
    }

    #[test]
    fn test_unreadable_and_malformed_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        assert!(matches!(load_file(&root.join("nope.json")), Err(Error::Io { .. })));
        fs::write(root.join("bad.json"), "{").unwrap();
        assert!(matches!(load_file(&root.join("bad.json")), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_plugin_shape_wins_over_create() {
        let json = serde_json::json!({
            "create": { "kind": "pattern", "regex": "x" },
            "rules": {
                "no-y": { "create": { "kind": "pattern", "regex": "y" } },
            }
        });
        let loaded = to_loaded(Path::new("p.json"), "$", json).unwrap();
        assert!(loaded.as_rule().is_none());
        assert!(loaded
            .get("rules")
            .and_then(|r| r.get("no-y"))
            .and_then(|r| r.as_rule().cloned())
            .is_some());

        let mixed = serde_json::json!({
            "create": { "kind": "pattern", "regex": "x" },
            "rules": { "note": "not a rule" }
        });
        assert!(to_loaded(Path::new("p.json"), "$", mixed).unwrap().as_rule().is_some());
    }
}
