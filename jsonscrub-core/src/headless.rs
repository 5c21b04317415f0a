// File: jsonscrub-core/src/headless.rs

//! `headless.rs`
//! Convenience wrapper for a one-shot redaction of a single document, without
//! setting up a batch.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::ScrubConfig;
use crate::engine::RedactionEngine;
use crate::pipeline::Redactor;
use crate::report::RedactionOutcome;
use crate::rules::{RuleSet, RuleSource};

/// Loads the rules for every configured kind from `source` and redacts `text`.
///
/// # Arguments
///
/// * `config` - Supported kinds, enabled actions and replacement values.
/// * `source` - Where rule files are read from.
/// * `source_name` - File name of the input; its extension selects the rules.
/// * `text` - The raw JSON text.
pub fn headless_redact_string(
    config: ScrubConfig,
    source: Arc<dyn RuleSource>,
    source_name: &str,
    text: &str,
) -> Result<RedactionOutcome> {
    let rule_set = Arc::new(RuleSet::new(source));
    rule_set.preload(&config.supported_file_extensions);
    let engine = Redactor::new(config, rule_set);
    engine
        .redact_text(source_name, text)
        .with_context(|| format!("Failed to sanitize '{}'", source_name))
}
