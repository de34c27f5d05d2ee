//! Rule modules, plugins, loaded artifact values and canonical rule entries.

use super::case::Tests;
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::fmt;
use std::sync::Arc;

/// Input handed to a rule's create hook for one snippet.
pub struct RuleContext<'a> {
    pub code: &'a str,
    pub filename: Option<&'a str>,
    pub options: Option<&'a Json>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A diagnostic reported by a rule. Positions are 1-based.
pub struct Diagnostic {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

impl Diagnostic {
    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            message_id: None,
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    pub fn ending_at(mut self, line: usize, column: usize) -> Self {
        self.end_line = Some(line);
        self.end_column = Some(column);
        self
    }
}

/// The callable create hook of a rule.
pub trait RuleLogic: Send + Sync {
    fn check(&self, cx: &RuleContext<'_>) -> Vec<Diagnostic>;
}

impl<F> RuleLogic for F
where
    F: Fn(&RuleContext<'_>) -> Vec<Diagnostic> + Send + Sync,
{
    fn check(&self, cx: &RuleContext<'_>) -> Vec<Diagnostic> {
        self(cx)
    }
}

#[derive(Clone)]
/// Opaque lint logic plus its declared tests. Never mutated by the harness.
pub struct RuleModule {
    pub logic: Arc<dyn RuleLogic>,
    pub meta: Json,
    pub tests: Option<Tests>,
}

impl RuleModule {
    pub fn new(logic: impl RuleLogic + 'static) -> Self {
        Self {
            logic: Arc::new(logic),
            meta: Json::Null,
            tests: None,
        }
    }

    pub fn with_tests(mut self, tests: Tests) -> Self {
        self.tests = Some(tests);
        self
    }

    pub fn with_meta(mut self, meta: Json) -> Self {
        self.meta = meta;
        self
    }
}

impl fmt::Debug for RuleModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleModule")
            .field("meta", &self.meta)
            .field("tests", &self.tests)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
/// A value produced by a loader, before normalization classifies it.
///
/// Objects keep their key order. `Data` holds plain JSON; objects and arrays
/// nested in `Data` are looked through by the accessors below.
pub enum Loaded {
    Rule(RuleModule),
    Object(Vec<(String, Loaded)>),
    List(Vec<Loaded>),
    Data(Json),
}

impl Loaded {
    /// Build an object value from ordered pairs.
    pub fn object<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Loaded)>) -> Self {
        Loaded::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Ordered fields of an object value, if this is one.
    pub fn fields(&self) -> Option<Vec<(String, Loaded)>> {
        match self {
            Loaded::Object(pairs) => Some(pairs.clone()),
            Loaded::Data(Json::Object(map)) => Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), Loaded::from(v.clone())))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Field lookup on an object value.
    pub fn get(&self, key: &str) -> Option<Loaded> {
        match self {
            Loaded::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()),
            Loaded::Data(Json::Object(map)) => map.get(key).cloned().map(Loaded::from),
            _ => None,
        }
    }

    pub fn as_rule(&self) -> Option<&RuleModule> {
        match self {
            Loaded::Rule(module) => Some(module),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Loaded::Data(Json::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON view of the value; `None` when it contains a rule.
    pub fn to_json(&self) -> Option<Json> {
        match self {
            Loaded::Rule(_) => None,
            Loaded::Data(v) => Some(v.clone()),
            Loaded::List(items) => items
                .iter()
                .map(Loaded::to_json)
                .collect::<Option<Vec<_>>>()
                .map(Json::Array),
            Loaded::Object(pairs) => pairs
                .iter()
                .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                .collect::<Option<Map<_, _>>>()
                .map(Json::Object),
        }
    }
}

impl From<Json> for Loaded {
    fn from(value: Json) -> Self {
        match value {
            Json::Object(map) => {
                Loaded::Object(map.into_iter().map(|(k, v)| (k, Loaded::from(v))).collect())
            }
            Json::Array(items) => Loaded::List(items.into_iter().map(Loaded::from).collect()),
            scalar => Loaded::Data(scalar),
        }
    }
}

impl From<RuleModule> for Loaded {
    fn from(module: RuleModule) -> Self {
        Loaded::Rule(module)
    }
}

#[derive(Debug, Clone)]
/// A loaded artifact and where it came from.
pub struct SourceArtifact {
    pub source_path: String,
    pub value: Loaded,
}

impl SourceArtifact {
    pub fn new(source_path: impl Into<String>, value: impl Into<Loaded>) -> Self {
        Self {
            source_path: source_path.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
/// A bundle of rules registered under a short name.
pub struct Plugin {
    pub name: String,
    pub rules: Vec<(String, RuleModule)>,
    pub languages: Vec<String>,
}

impl Plugin {
    pub fn rule(&self, name: &str) -> Option<&RuleModule> {
        self.rules.iter().find(|(n, _)| n == name).map(|(_, m)| m)
    }
}

#[derive(Debug, Clone, Default)]
/// Engine-level settings inherited from how a rule was discovered.
pub struct ExecutionConfig {
    pub plugins: Vec<(String, Arc<Plugin>)>,
    pub language: Option<String>,
    pub settings: Map<String, Json>,
}

impl ExecutionConfig {
    /// Latest syntax, module source. `language_options` replaces the default
    /// `languageOptions` table when given.
    pub fn baseline(language_options: Option<Json>) -> Self {
        let language_options = language_options.unwrap_or_else(|| {
            serde_json::json!({
                "ecmaVersion": "latest",
                "sourceType": "module",
            })
        });
        let mut settings = Map::new();
        settings.insert("languageOptions".to_string(), language_options);
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty() && self.language.is_none() && self.settings.is_empty()
    }

    pub fn plugin(&self, name: &str) -> Option<&Plugin> {
        self.plugins
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_ref())
    }
}

#[derive(Debug, Clone)]
/// Canonical unit of work: a namespaced rule bound to its execution config.
pub struct RuleEntry {
    pub name: String,
    pub module: RuleModule,
    pub config: Arc<ExecutionConfig>,
}
