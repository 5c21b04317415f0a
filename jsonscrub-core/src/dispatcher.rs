//! Applies a rule list to one document.
//!
//! Pointers are resolved against the original document and written into a
//! working copy, so one rule's mutation never moves another rule's target.
//! Pointers are grouped by action in discovery order; identical pointers
//! within a group are applied once.
//!
//! Unsupported actions, unresolvable expressions and broken pointers are
//! soft failures: they are logged, recorded on the [`RedactionPass`] and the
//! document carries on.

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::actions::{ActionKind, ActionRegistry};
use crate::errors::ScrubError;
use crate::mutator::{get_at_pointer, set_at_pointer, Pointer};
use crate::redaction_log::log_replacement_debug;
use crate::resolver::{resolve, PathQuery};
use crate::rules::Rule;

/// A rule skipped because its action is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAction {
    pub path_expression: String,
    pub action: ActionKind,
    pub description: String,
}

/// A pointer that could not be applied to the working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenPointer {
    pub action: ActionKind,
    pub pointer: String,
    pub reason: String,
}

/// A rule whose path expression the matcher rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRule {
    pub path_expression: String,
    pub reason: String,
}

/// Result of applying a rule list.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionPass {
    /// The redacted copy.
    pub document: Value,
    /// Number of locations actually rewritten.
    pub applied_count: usize,
    pub skipped_actions: Vec<SkippedAction>,
    pub broken_pointers: Vec<BrokenPointer>,
    pub unresolved_rules: Vec<UnresolvedRule>,
}

#[derive(Debug)]
struct ActionGroup {
    action: ActionKind,
    pointers: Vec<Pointer>,
    seen: HashSet<Pointer>,
}

impl ActionGroup {
    fn push(&mut self, pointer: Pointer) {
        if self.seen.insert(pointer.clone()) {
            self.pointers.push(pointer);
        }
    }
}

/// Groups pointers and applies registered actions.
pub struct ActionDispatcher<'a> {
    registry: &'a ActionRegistry,
    query: &'a dyn PathQuery,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(registry: &'a ActionRegistry, query: &'a dyn PathQuery) -> Self {
        Self { registry, query }
    }

    pub fn apply_rules(&self, rules: &[Rule], document: &Value) -> RedactionPass {
        let mut mutated = document.clone();
        let mut skipped_actions = Vec::new();
        let mut unresolved_rules = Vec::new();
        let mut groups: Vec<ActionGroup> = Vec::new();

        for rule in rules {
            if !self.registry.supports(&rule.action) {
                let skipped = ScrubError::UnsupportedAction {
                    action: rule.action.to_string(),
                    path_expression: rule.path_expression.clone(),
                };
                warn!("Skipping rule \"{}\": {}", rule.description, skipped);
                skipped_actions.push(SkippedAction {
                    path_expression: rule.path_expression.clone(),
                    action: rule.action.clone(),
                    description: rule.description.clone(),
                });
                continue;
            }

            let pointers = match resolve(self.query, &rule.path_expression, document) {
                Ok(pointers) => pointers,
                Err(e) => {
                    warn!("Error running rule '{}': {}", rule.path_expression, e);
                    unresolved_rules.push(UnresolvedRule {
                        path_expression: rule.path_expression.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let group_index = match groups.iter().position(|g| g.action == rule.action) {
                Some(index) => index,
                None => {
                    groups.push(ActionGroup {
                        action: rule.action.clone(),
                        pointers: Vec::new(),
                        seen: HashSet::new(),
                    });
                    groups.len() - 1
                }
            };
            for pointer in pointers {
                groups[group_index].push(pointer);
            }
        }

        let mut applied_count = 0;
        let mut broken_pointers = Vec::new();

        for group in &groups {
            let Some(action) = self.registry.get(&group.action) else {
                continue;
            };
            for pointer in &group.pointers {
                let Some(current) = get_at_pointer(&mutated, pointer) else {
                    let reason = "location no longer exists in the working copy".to_string();
                    warn!("{} {}: {}", group.action, pointer, reason);
                    broken_pointers.push(BrokenPointer {
                        action: group.action.clone(),
                        pointer: pointer.to_string(),
                        reason,
                    });
                    continue;
                };

                let Some(replacement) = action.replacement(current) else {
                    debug!("{} {}: left as is.", group.action, pointer);
                    continue;
                };
                if &replacement == current {
                    debug!("Skipping {} as it has already been sanitized.", pointer);
                    continue;
                }
                log_replacement_debug(group.action.as_str(), &pointer.to_string(), current, &replacement);

                match set_at_pointer(&mut mutated, pointer, replacement) {
                    Ok(_) => applied_count += 1,
                    Err(ScrubError::BrokenPointer { pointer, reason }) => {
                        warn!("{} {}: {}", group.action, pointer, reason);
                        broken_pointers.push(BrokenPointer {
                            action: group.action.clone(),
                            pointer,
                            reason,
                        });
                    }
                    Err(other) => {
                        warn!("{} {}: {}", group.action, pointer, other);
                        broken_pointers.push(BrokenPointer {
                            action: group.action.clone(),
                            pointer: pointer.to_string(),
                            reason: other.to_string(),
                        });
                    }
                }
            }
        }

        RedactionPass {
            document: mutated,
            applied_count,
            skipped_actions,
            broken_pointers,
            unresolved_rules,
        }
    }
}
