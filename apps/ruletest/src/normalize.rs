//! Input normalization: loaded artifacts to canonical rule entries.
//!
//! Each artifact is classified once into an [`Artifact`] and every variant
//! maps to its own namespacing policy:
//! - bare rule: named after the source file stem, no plugin;
//! - plugin bundle: `<short>/<rule>`, plugin registered in the config;
//! - configuration list: rule ids resolved through each config's `plugins`.
//!   Ids that do not resolve are dropped without an error.
//!
//! A value of any other shape aborts normalization with an error naming the
//! source.

use crate::error::{Error, Result};
use crate::models::{ExecutionConfig, Loaded, Plugin, RuleEntry, RuleModule, SourceArtifact};
use serde_json::{Map, Value as Json};
use std::path::Path;
use std::sync::Arc;

const PLUGIN_PREFIX: &str = "eslint-plugin-";

/// The recognized artifact shapes.
pub enum Artifact<'a> {
    BareRule(&'a RuleModule),
    PluginBundle(Plugin),
    ConfigList(&'a [Loaded]),
}

/// Classify a loaded value; `None` when it matches no recognized shape.
pub fn classify<'a>(value: &'a Loaded, fallback_name: &str) -> Option<Artifact<'a>> {
    match value {
        Loaded::Rule(module) => Some(Artifact::BareRule(module)),
        Loaded::List(items) => Some(Artifact::ConfigList(items)),
        Loaded::Object(_) | Loaded::Data(Json::Object(_)) if is_plugin_bundle(value) => {
            plugin_from(value, fallback_name).map(Artifact::PluginBundle)
        }
        _ => None,
    }
}

/// A `rules` mapping whose every value is a rule.
fn is_plugin_bundle(value: &Loaded) -> bool {
    value
        .get("rules")
        .and_then(|rules| rules.fields())
        .map(|rules| rules.iter().all(|(_, v)| v.as_rule().is_some()))
        .unwrap_or(false)
}

/// Build a plugin from a bundle-like value. Non-rule members of `rules` are
/// ignored so that config lookups stay lenient.
fn plugin_from(value: &Loaded, fallback_name: &str) -> Option<Plugin> {
    let rules = value.get("rules")?.fields()?;
    let declared = value
        .get("meta")
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str().map(str::to_string))
        .or_else(|| value.get("name").and_then(|n| n.as_str().map(str::to_string)));
    let name = short_plugin_name(declared.as_deref().unwrap_or(fallback_name));
    let languages = value
        .get("languages")
        .and_then(|l| l.fields())
        .map(|l| l.into_iter().map(|(k, _)| k).collect())
        .unwrap_or_default();
    Some(Plugin {
        name,
        rules: rules
            .into_iter()
            .filter_map(|(k, v)| v.as_rule().cloned().map(|m| (k, m)))
            .collect(),
        languages,
    })
}

/// Strip the conventional package prefix from a plugin name.
pub fn short_plugin_name(name: &str) -> String {
    name.strip_prefix(PLUGIN_PREFIX).unwrap_or(name).to_string()
}

/// File stem of a source path (`rules/no-foo.json` -> `no-foo`).
pub fn base_name(source_path: &str) -> String {
    Path::new(source_path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| source_path.to_string())
}

/// Reduce artifacts to an ordered list of rule entries.
///
/// A later entry with an already-seen name replaces the earlier one in place.
pub fn normalize(artifacts: &[SourceArtifact]) -> Result<Vec<RuleEntry>> {
    let mut entries: Vec<RuleEntry> = Vec::new();
    for artifact in artifacts {
        let file_name = base_name(&artifact.source_path);
        let produced = match classify(&artifact.value, &file_name) {
            Some(Artifact::BareRule(module)) => vec![RuleEntry {
                name: file_name.clone(),
                module: module.clone(),
                config: Arc::new(ExecutionConfig::default()),
            }],
            Some(Artifact::PluginBundle(plugin)) => plugin_entries(plugin),
            Some(Artifact::ConfigList(configs)) => configs.iter().flat_map(config_entries).collect(),
            None => {
                return Err(Error::UnrecognizedArtifact {
                    source_path: artifact.source_path.clone(),
                })
            }
        };
        tracing::debug!(
            source = %artifact.source_path,
            entries = produced.len(),
            "normalized artifact"
        );
        for entry in produced {
            push_entry(&mut entries, entry);
        }
    }
    Ok(entries)
}

fn push_entry(entries: &mut Vec<RuleEntry>, entry: RuleEntry) {
    match entries.iter_mut().find(|e| e.name == entry.name) {
        Some(existing) => {
            tracing::debug!(rule = %entry.name, "duplicate rule name; later entry wins");
            *existing = entry;
        }
        None => entries.push(entry),
    }
}

fn plugin_entries(plugin: Plugin) -> Vec<RuleEntry> {
    let short = plugin.name.clone();
    let language = plugin
        .languages
        .first()
        .map(|lang| format!("{}/{}", short, lang));
    let plugin = Arc::new(plugin);
    let config = Arc::new(ExecutionConfig {
        plugins: vec![(short.clone(), plugin.clone())],
        language,
        settings: Map::new(),
    });
    plugin
        .rules
        .iter()
        .map(|(rule_name, module)| RuleEntry {
            name: format!("{}/{}", short, rule_name),
            module: module.clone(),
            config: config.clone(),
        })
        .collect()
}

/// Entries of one configuration object. Everything except `rules` becomes
/// the execution config; `plugins` is registered by its mapping keys.
fn config_entries(config: &Loaded) -> Vec<RuleEntry> {
    let fields = config.fields().unwrap_or_default();
    let mut exec = ExecutionConfig::default();
    let mut rule_ids: Vec<String> = Vec::new();
    let mut plugins_value: Option<Loaded> = None;
    for (key, value) in fields {
        match key.as_str() {
            "rules" => {
                rule_ids = value
                    .fields()
                    .map(|r| r.into_iter().map(|(id, _)| id).collect())
                    .unwrap_or_default();
            }
            "plugins" => {
                exec.plugins = value
                    .fields()
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|(name, p)| plugin_from(&p, &name).map(|pl| (name, Arc::new(pl))))
                    .collect();
                plugins_value = Some(value);
            }
            "language" => exec.language = value.as_str().map(str::to_string),
            _ => match value.to_json() {
                Some(Json::Null) | None => {}
                Some(json) => {
                    exec.settings.insert(key, json);
                }
            },
        }
    }
    let exec = Arc::new(exec);
    rule_ids
        .into_iter()
        .filter_map(|id| {
            let module = resolve_rule(plugins_value.as_ref(), &id);
            if module.is_none() {
                tracing::debug!(rule = %id, "config references an unknown rule; skipped");
            }
            module.map(|module| RuleEntry {
                name: id,
                module,
                config: exec.clone(),
            })
        })
        .collect()
}

/// `plugins[plugin].rules[rule]` for an id of the form `plugin/rule`.
fn resolve_rule(plugins: Option<&Loaded>, id: &str) -> Option<RuleModule> {
    let mut parts = id.split('/');
    let plugin_name = parts.next()?;
    let rule_name = parts.next()?;
    plugins?
        .get(plugin_name)?
        .get("rules")?
        .get(rule_name)?
        .as_rule()
        .cloned()
}
