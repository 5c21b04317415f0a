//! Rule files and the per-session rule cache.
//!
//! A rule file holds the redaction rules for one document kind:
//!
//! ```yaml
//! description: Rules for sanitizing HTTP Archive (HAR) captures.
//! format: har
//! rules:
//!   "$.log.entries[*].request.cookies[*].value":
//!     action: remove
//!     description: Request cookie values
//! ```
//!
//! Rules keep the order in which they appear in the file. [`RuleSet`] loads
//! each kind at most once per session and serves later requests from memory.
//!
//! License: MIT OR Apache-2.0

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::actions::ActionKind;
use crate::errors::ScrubError;

/// A single path-based redaction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub path_expression: String,
    pub action: ActionKind,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct RuleInfo {
    action: ActionKind,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct RawRuleFile {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    rules: Option<serde_yml::Mapping>,
}

/// The parsed rules for one document kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleFile {
    pub description: Option<String>,
    pub format: Option<String>,
    pub rules: Vec<Rule>,
}

impl RuleFile {
    /// Parses rule-file YAML. `location` is only used in error messages.
    pub fn from_yaml_str(text: &str, location: &str) -> Result<Self, ScrubError> {
        let rule_file_error = |reason: String| ScrubError::RuleFile {
            path: location.to_string(),
            reason,
        };

        let raw: RawRuleFile = serde_yml::from_str(text).map_err(|e| rule_file_error(e.to_string()))?;
        let mapping = raw
            .rules
            .ok_or_else(|| rule_file_error("missing `rules` mapping".to_string()))?;

        let mut rules = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let path_expression = key
                .as_str()
                .ok_or_else(|| rule_file_error(format!("rule key {:?} is not a string", key)))?
                .to_string();
            let info: RuleInfo = serde_yml::from_value(value)
                .map_err(|e| rule_file_error(format!("rule '{}': {}", path_expression, e)))?;
            rules.push(Rule {
                path_expression,
                action: info.action,
                description: info.description,
            });
        }

        Ok(Self {
            description: raw.description,
            format: raw.format,
            rules,
        })
    }
}

/// Where rule files come from.
pub trait RuleSource: Send + Sync {
    /// Returns the raw rule-file text for `kind`.
    fn fetch(&self, kind: &str) -> Result<String, ScrubError>;

    /// Human-readable location of the rule file for `kind`.
    fn location(&self, kind: &str) -> String;
}

/// Reads `<dir>/<kind>.yaml`.
#[derive(Debug, Clone)]
pub struct DirRuleSource {
    dir: PathBuf,
}

impl DirRuleSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, kind: &str) -> PathBuf {
        self.dir.join(format!("{}.yaml", kind))
    }
}

impl RuleSource for DirRuleSource {
    fn fetch(&self, kind: &str) -> Result<String, ScrubError> {
        let path = self.path_for(kind);
        std::fs::read_to_string(&path).map_err(|e| ScrubError::RuleFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn location(&self, kind: &str) -> String {
        self.path_for(kind).display().to_string()
    }
}

/// Rule files compiled into the library.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedRuleSource;

const EMBEDDED_HAR_RULES: &str = include_str!("../config/rules/har.yaml");

impl RuleSource for EmbeddedRuleSource {
    fn fetch(&self, kind: &str) -> Result<String, ScrubError> {
        match kind {
            "har" => Ok(EMBEDDED_HAR_RULES.to_string()),
            other => Err(ScrubError::RuleFile {
                path: self.location(other),
                reason: "no built-in rules for this kind".to_string(),
            }),
        }
    }

    fn location(&self, kind: &str) -> String {
        format!("rules/{}.yaml", kind)
    }
}

/// Session cache of rule files, keyed by document kind.
pub struct RuleSet {
    source: Arc<dyn RuleSource>,
    cache: RwLock<HashMap<String, Arc<RuleFile>>>,
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("loaded_kinds", &self.loaded_kinds())
            .finish()
    }
}

impl RuleSet {
    pub fn new(source: Arc<dyn RuleSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Rule set backed by the built-in rule files.
    pub fn embedded() -> Self {
        Self::new(Arc::new(EmbeddedRuleSource))
    }

    /// Loads the rules for `kind`, caching them on first use.
    pub fn load_rules(&self, kind: &str) -> Result<Arc<RuleFile>, ScrubError> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(rules) = cache.get(kind) {
                debug!("Serving rules for '{}' from cache.", kind);
                return Ok(Arc::clone(rules));
            }
        }

        let location = self.source.location(kind);
        info!("Loading rules for '{}' from {}", kind, location);
        let text = self.source.fetch(kind)?;
        let parsed = Arc::new(RuleFile::from_yaml_str(&text, &location)?);
        info!("Loaded {} rule(s) for '{}'.", parsed.rules.len(), kind);

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        // A concurrent loader may have won the race; keep the first entry.
        let entry = cache.entry(kind.to_string()).or_insert(parsed);
        Ok(Arc::clone(entry))
    }

    /// Returns previously loaded rules for `kind`.
    pub fn get_rules(&self, kind: &str) -> Result<Arc<RuleFile>, ScrubError> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache
            .get(kind)
            .cloned()
            .ok_or_else(|| ScrubError::RulesUnavailable {
                kind: kind.to_string(),
            })
    }

    /// Loads every kind, logging the ones that fail. Returns the failures.
    pub fn preload<S: AsRef<str>>(&self, kinds: &[S]) -> Vec<(String, ScrubError)> {
        let mut failures = Vec::new();
        for kind in kinds {
            let kind = kind.as_ref();
            if let Err(e) = self.load_rules(kind) {
                warn!("Error loading rule set for '{}' files: {}", kind, e);
                failures.push((kind.to_string(), e));
            }
        }
        failures
    }

    /// Location of the rule file for `kind`.
    pub fn rule_file_path(&self, kind: &str) -> String {
        self.source.location(kind)
    }

    /// Kinds currently in the cache, sorted.
    pub fn loaded_kinds(&self) -> Vec<String> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        let mut kinds: Vec<String> = cache.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}
