// jsonscrub-core/src/lib.rs
//! # jsonscrub Core Library
//!
//! `jsonscrub-core` redacts sensitive fields from JSON-shaped documents (HAR
//! captures in the default configuration) using declarative, path-based rules,
//! and reports exactly what changed with a unified diff.
//!
//! The library performs no terminal output and never writes files; loading and
//! exporting are injected through the [`DocumentLoader`] and [`ExportSink`]
//! traits.
//!
//! ## Modules
//!
//! * `config`: [`ScrubConfig`], the injected set of kinds, actions and limits.
//! * `document`: the parsed [`Document`] and its kind.
//! * `rules`: rule files, rule sources and the per-session [`RuleSet`] cache.
//! * `resolver`: the [`PathQuery`] capability and pointer resolution.
//! * `actions`: the [`ActionRegistry`] and built-in actions.
//! * `dispatcher`: groups resolved pointers by action and applies them.
//! * `mutator`: [`Pointer`] traversal and in-place assignment.
//! * `report`: serialization, diffs and [`RedactionOutcome`].
//! * `batch`: the [`BatchCoordinator`] state machine and intake checks.
//! * `pipeline`: the [`Redactor`] engine and the async batch runner.
//! * `headless`: one-shot redaction of a single string.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use jsonscrub_core::{ScrubConfig, EmbeddedRuleSource, headless_redact_string};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let har = r#"{"log":{"entries":[{"request":{"cookies":[{"name":"sid","value":"s3cr3t"}]}}]}}"#;
//!     let outcome = headless_redact_string(
//!         ScrubConfig::default(),
//!         Arc::new(EmbeddedRuleSource),
//!         "capture.har",
//!         har,
//!     )?;
//!     assert!(outcome.changed);
//!     println!("{}", outcome.diff_text);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`ScrubError`]; convenience wrappers return
//! `anyhow::Result`. Unsupported actions and broken pointers never fail a
//! document, they are recorded on its outcome.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod actions;
pub mod batch;
pub mod config;
pub mod dispatcher;
pub mod document;
pub mod engine;
pub mod errors;
pub mod headless;
pub mod mutator;
pub mod pipeline;
pub mod redaction_log;
pub mod report;
pub mod resolver;
pub mod rules;

/// Re-exports the configuration types.
pub use config::{load_config, ScrubConfig, DEFAULT_REMOVED_REPLACEMENT, DEFAULT_SECRET_PREFIX};

pub use errors::ScrubError;

pub use document::{document_kind, Document};

pub use rules::{DirRuleSource, EmbeddedRuleSource, Rule, RuleFile, RuleSet, RuleSource};

pub use resolver::{resolve, JsonPathQuery, PathQuery};

pub use actions::{
    ActionKind, ActionRegistry, ContextualReplacementAction, RedactionAction, RemoveAction,
};

pub use dispatcher::{ActionDispatcher, RedactionPass, SkippedAction};

pub use mutator::{get_at_pointer, set_at_pointer, Pointer};

pub use report::{sanitized_name, ChangeReporter, DiffCapability, RedactionOutcome, UnifiedDiff};

pub use batch::{
    validate_intake, BatchCoordinator, BatchInput, BatchPhase, DocumentDisposition,
    DocumentStatus, FailedDocument,
};

pub use engine::RedactionEngine;

pub use pipeline::{export_outcomes, run_batch, DocumentLoader, ExportSink, Redactor};

pub use headless::headless_redact_string;
