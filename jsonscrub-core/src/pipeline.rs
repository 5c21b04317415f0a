//! The per-document pipeline and the asynchronous batch runner.
//!
//! Every document is its own tokio task (load, parse, redact, report). Tasks
//! send their result over an mpsc channel to one consumer that owns the
//! [`BatchCoordinator`], which keeps `submit` single-writer. The batch is
//! checked for completion after every submission.
//!
//! License: MIT OR APACHE 2.0

use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::actions::ActionRegistry;
use crate::batch::{validate_intake, BatchCoordinator, BatchInput, Generation};
use crate::config::ScrubConfig;
use crate::dispatcher::ActionDispatcher;
use crate::document::Document;
use crate::engine::RedactionEngine;
use crate::errors::ScrubError;
use crate::report::{ChangeReporter, DiffCapability, RedactionOutcome};
use crate::resolver::{JsonPathQuery, PathQuery};
use crate::rules::RuleSet;

/// The rule-based redaction engine.
pub struct Redactor {
    config: ScrubConfig,
    rule_set: Arc<RuleSet>,
    registry: ActionRegistry,
    query: Arc<dyn PathQuery>,
    reporter: ChangeReporter,
}

impl std::fmt::Debug for Redactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redactor")
            .field("config", &self.config)
            .field("rule_set", &self.rule_set)
            .field("registry", &self.registry)
            .finish()
    }
}

impl Redactor {
    /// Builds an engine with the JSONPath matcher, the `diffy` diff and the
    /// actions enabled by `config`.
    pub fn new(config: ScrubConfig, rule_set: Arc<RuleSet>) -> Self {
        let registry = ActionRegistry::from_config(&config);
        Self {
            config,
            rule_set,
            registry,
            query: Arc::new(JsonPathQuery),
            reporter: ChangeReporter::default(),
        }
    }

    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_path_query(mut self, query: Arc<dyn PathQuery>) -> Self {
        self.query = query;
        self
    }

    pub fn with_diff(mut self, diff: Arc<dyn DiffCapability>) -> Self {
        self.reporter = ChangeReporter::new(diff);
        self
    }
}

impl RedactionEngine for Redactor {
    fn redact_document(&self, document: &Document) -> Result<RedactionOutcome, ScrubError> {
        let kind = document.kind();
        if !self.config.supports_kind(kind) {
            return Err(ScrubError::UnsupportedKind {
                kind: kind.to_string(),
                supported: self.config.supported_file_extensions.join(","),
            });
        }

        let rule_file = self.rule_set.get_rules(kind)?;
        debug!(
            "Sanitizing '{}' with {} rule(s) for '{}'.",
            document.source_name(),
            rule_file.rules.len(),
            kind
        );

        let dispatcher = ActionDispatcher::new(&self.registry, self.query.as_ref());
        let pass = dispatcher.apply_rules(&rule_file.rules, document.content());
        let outcome =
            self.reporter
                .report(document, pass, &self.rule_set.rule_file_path(kind))?;

        info!(
            "'{}' processed: {} replacement(s), changed={}.",
            outcome.source_name, outcome.applied_count, outcome.changed
        );
        Ok(outcome)
    }

    fn config(&self) -> &ScrubConfig {
        &self.config
    }
}

/// Asynchronously reads the text of a batch input.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, input: &BatchInput) -> Result<String, ScrubError>;
}

struct DocumentResult {
    generation: Generation,
    source_name: String,
    result: Result<RedactionOutcome, ScrubError>,
}

/// Processes `inputs` concurrently and records every result in `coordinator`.
///
/// Intake limits are checked first; a rejected batch leaves the coordinator
/// untouched. A document whose task dies before reporting is recorded as
/// failed, so a returned batch always accounts for every input.
pub async fn run_batch(
    engine: Arc<dyn RedactionEngine>,
    loader: Arc<dyn DocumentLoader>,
    coordinator: &mut BatchCoordinator,
    inputs: Vec<BatchInput>,
) -> Result<(), ScrubError> {
    validate_intake(&inputs, engine.config())?;

    let generation = coordinator.begin_batch(inputs.len());
    if coordinator.is_complete() {
        return Ok(());
    }

    let (tx, mut rx) = mpsc::channel::<DocumentResult>(inputs.len());
    let mut tasks = Vec::with_capacity(inputs.len());
    for input in inputs {
        let source_name = input.source_name.clone();
        let tx = tx.clone();
        let engine = Arc::clone(&engine);
        let loader = Arc::clone(&loader);
        let handle = tokio::spawn(async move {
            let result = match loader.load(&input).await {
                Ok(text) => engine.redact_text(&input.source_name, &text),
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                if e.is_document_failure() {
                    warn!("Error sanitizing '{}': {}", input.source_name, e);
                } else {
                    error!("Unexpected error sanitizing '{}': {}", input.source_name, e);
                }
            }
            let message = DocumentResult {
                generation,
                source_name: input.source_name,
                result,
            };
            if tx.send(message).await.is_err() {
                debug!("Batch consumer went away; dropping result.");
            }
        });
        tasks.push((source_name, handle));
    }
    drop(tx);

    while let Some(message) = rx.recv().await {
        coordinator.accept(message.generation, &message.source_name, message.result)?;
        if coordinator.is_complete() {
            break;
        }
    }

    // The channel only closes once every task has ended, so a task that
    // never reported must have panicked or been cancelled.
    for (source_name, handle) in tasks {
        if coordinator.is_complete() {
            break;
        }
        if let Err(join_error) = handle.await {
            let failure = ScrubError::TaskFailed {
                source_name: source_name.clone(),
                reason: join_error.to_string(),
            };
            error!("{}", failure);
            coordinator.accept(generation, &source_name, Err(failure))?;
        }
    }

    if !coordinator.is_complete() {
        warn!(
            "Batch {} ended with {} of {} document(s) recorded.",
            generation,
            coordinator.statuses().count(),
            coordinator.expected_count()
        );
    }
    Ok(())
}

/// Where exported documents go.
pub trait ExportSink {
    fn save(&mut self, sanitized_name: &str, contents: &str) -> anyhow::Result<()>;
}

/// Hands every exportable outcome to `sink`. Returns how many were saved.
pub fn export_outcomes(coordinator: &BatchCoordinator, sink: &mut dyn ExportSink) -> anyhow::Result<usize> {
    let exportable = coordinator.exportable_outcomes();
    for outcome in &exportable {
        sink.save(&outcome.sanitized_name, &outcome.sanitized_serialized)?;
    }
    Ok(exportable.len())
}
