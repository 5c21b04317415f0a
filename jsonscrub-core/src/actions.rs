//! Redaction actions and the registry that enables them.
//!
//! An action computes the replacement for one matched value. Which actions a
//! session may use is decided by configuration: [`ActionRegistry::from_config`]
//! enables exactly the names listed in `supported_actions`, so adding an
//! action never touches the dispatcher's control flow.
//!
//! License: MIT OR APACHE 2.0

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::ScrubConfig;
use crate::errors::ScrubError;

pub const REMOVE: &str = "remove";
pub const CONTEXTUAL_REPLACEMENT: &str = "contextual_replacement";

/// Name of an action as written in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionKind(String);

impl ActionKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Computes the value written over a matched location.
pub trait RedactionAction: Send + Sync {
    fn name(&self) -> &str;

    /// Replacement for `current`. `None` leaves the value as it is.
    fn replacement(&self, current: &Value) -> Option<Value>;
}

/// Replaces any value with a fixed sentinel.
#[derive(Debug, Clone)]
pub struct RemoveAction {
    sentinel: String,
}

impl RemoveAction {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }
}

impl RedactionAction for RemoveAction {
    fn name(&self) -> &str {
        REMOVE
    }

    fn replacement(&self, _current: &Value) -> Option<Value> {
        Some(Value::String(self.sentinel.clone()))
    }
}

/// Replaces a value with `<prefix>_<sha256>` so equal secrets share a token.
///
/// Values that already look sanitized are left alone.
#[derive(Debug, Clone)]
pub struct ContextualReplacementAction {
    prefix: String,
    removed_sentinel: String,
    already_replaced: Regex,
}

impl ContextualReplacementAction {
    pub fn new(
        prefix: impl Into<String>,
        removed_sentinel: impl Into<String>,
    ) -> Result<Self, ScrubError> {
        let prefix = prefix.into();
        let already_replaced = Regex::new(&format!(r"^{}_\w+$", regex::escape(&prefix)))
            .map_err(|e| ScrubError::Config(format!("invalid secret prefix '{}': {}", prefix, e)))?;
        Ok(Self {
            prefix,
            removed_sentinel: removed_sentinel.into(),
            already_replaced,
        })
    }

    fn token_for(&self, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        format!("{}_{}", self.prefix, hex::encode(hasher.finalize()))
    }
}

impl RedactionAction for ContextualReplacementAction {
    fn name(&self) -> &str {
        CONTEXTUAL_REPLACEMENT
    }

    fn replacement(&self, current: &Value) -> Option<Value> {
        let secret = match current {
            Value::String(s) => s.clone(),
            Value::Null => return None,
            other => other.to_string(),
        };
        if secret == self.removed_sentinel || self.already_replaced.is_match(&secret) {
            return None;
        }
        Some(Value::String(self.token_for(&secret)))
    }
}

/// The set of actions a session may apply, keyed by name.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<ActionKind, Arc<dyn RedactionAction>>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from `supported_actions`, using the built-in
    /// handler for each listed name. Names without a handler are ignored.
    pub fn from_config(config: &ScrubConfig) -> Self {
        let mut registry = Self::new();
        for name in &config.supported_actions {
            match name.as_str() {
                REMOVE => registry.register(Arc::new(RemoveAction::new(
                    config.removed_secret_replacement.clone(),
                ))),
                CONTEXTUAL_REPLACEMENT => match ContextualReplacementAction::new(
                    config.secret_prefix.clone(),
                    config.removed_secret_replacement.clone(),
                ) {
                    Ok(action) => registry.register(Arc::new(action)),
                    Err(e) => warn!("Action '{}' disabled: {}", name, e),
                },
                other => warn!(
                    "Action '{}' is listed as supported but has no handler; ignoring it.",
                    other
                ),
            }
        }
        registry
    }

    /// Adds or replaces the handler for `action.name()`.
    pub fn register(&mut self, action: Arc<dyn RedactionAction>) {
        self.actions.insert(ActionKind::new(action.name()), action);
    }

    pub fn get(&self, kind: &ActionKind) -> Option<&Arc<dyn RedactionAction>> {
        self.actions.get(kind)
    }

    pub fn supports(&self, kind: &ActionKind) -> bool {
        self.actions.contains_key(kind)
    }

    pub fn names(&self) -> impl Iterator<Item = &ActionKind> {
        self.actions.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remove_always_writes_sentinel() {
        let action = RemoveAction::new("<REMOVED>");
        assert_eq!(action.replacement(&json!("secret")), Some(json!("<REMOVED>")));
        assert_eq!(action.replacement(&json!({"nested": 1})), Some(json!("<REMOVED>")));
    }

    #[test]
    fn test_contextual_replacement_is_stable_per_secret() {
        let action = ContextualReplacementAction::new("SECRET", "<REMOVED>").unwrap();
        let a = action.replacement(&json!("hunter2")).unwrap();
        let b = action.replacement(&json!("hunter2")).unwrap();
        let c = action.replacement(&json!("hunter3")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().unwrap().starts_with("SECRET_"));
    }

    #[test]
    fn test_contextual_replacement_skips_sanitized_values() {
        let action = ContextualReplacementAction::new("SECRET", "<REMOVED>").unwrap();
        let token = action.replacement(&json!("pw")).unwrap();
        assert_eq!(action.replacement(&token), None);
        assert_eq!(action.replacement(&json!("<REMOVED>")), None);
        assert_eq!(action.replacement(&Value::Null), None);
    }

    #[test]
    fn test_registry_follows_config() {
        let mut config = ScrubConfig::default();
        let registry = ActionRegistry::from_config(&config);
        assert!(registry.supports(&ActionKind::from(REMOVE)));
        assert!(!registry.supports(&ActionKind::from(CONTEXTUAL_REPLACEMENT)));

        config.supported_actions = vec![CONTEXTUAL_REPLACEMENT.into(), "mask".into()];
        let registry = ActionRegistry::from_config(&config);
        let names: Vec<&str> = registry.names().map(ActionKind::as_str).collect();
        assert_eq!(names, vec![CONTEXTUAL_REPLACEMENT]);
    }
}
