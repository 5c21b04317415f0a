//! Batch bookkeeping: which documents finished, how, and whether all did.
//!
//! The coordinator is the only shared mutable state of a run. It is owned by
//! a single consumer (see `pipeline::run_batch`), so submissions never
//! interleave.
//!
//! State machine: `Empty -> Collecting -> Complete`, and `reset()` returns to
//! `Empty` from anywhere.

use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::ScrubConfig;
use crate::errors::ScrubError;
use crate::report::RedactionOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchPhase {
    Empty,
    Collecting,
    Complete,
}

/// A document whose pipeline aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDocument {
    pub source_name: String,
    pub reason: String,
}

/// What was recorded for one source name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Processed(RedactionOutcome),
    Failed(FailedDocument),
}

impl DocumentStatus {
    pub fn source_name(&self) -> &str {
        match self {
            DocumentStatus::Processed(outcome) => &outcome.source_name,
            DocumentStatus::Failed(failed) => &failed.source_name,
        }
    }
}

/// Three-way classification shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentDisposition {
    Untouched,
    Redacted,
    Failed,
}

impl DocumentStatus {
    pub fn disposition(&self) -> DocumentDisposition {
        match self {
            DocumentStatus::Processed(outcome) if outcome.changed => DocumentDisposition::Redacted,
            DocumentStatus::Processed(_) => DocumentDisposition::Untouched,
            DocumentStatus::Failed(_) => DocumentDisposition::Failed,
        }
    }
}

/// Monotonic batch identifier; results from older generations are stale.
pub type Generation = u64;

#[derive(Debug)]
pub struct BatchCoordinator {
    phase: BatchPhase,
    generation: Generation,
    expected_count: usize,
    outcomes: BTreeMap<String, DocumentStatus>,
    rule_files_referenced: BTreeSet<String>,
}

impl Default for BatchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchCoordinator {
    pub fn new() -> Self {
        Self {
            phase: BatchPhase::Empty,
            generation: 0,
            expected_count: 0,
            outcomes: BTreeMap::new(),
            rule_files_referenced: BTreeSet::new(),
        }
    }

    /// Discards any previous state and starts collecting `expected_count`
    /// documents. Returns the new generation.
    pub fn begin_batch(&mut self, expected_count: usize) -> Generation {
        self.clear_state();
        self.expected_count = expected_count;
        self.phase = if expected_count == 0 {
            BatchPhase::Complete
        } else {
            BatchPhase::Collecting
        };
        info!(
            "Batch {} started, expecting {} document(s).",
            self.generation, expected_count
        );
        self.generation
    }

    /// Drops all results and returns to `Empty`.
    pub fn reset(&mut self) {
        self.clear_state();
        self.phase = BatchPhase::Empty;
        debug!("Batch state reset (generation {}).", self.generation);
    }

    fn clear_state(&mut self) {
        self.generation += 1;
        self.expected_count = 0;
        self.outcomes.clear();
        self.rule_files_referenced.clear();
    }

    fn ensure_collecting(&self, source_name: &str) -> Result<(), ScrubError> {
        match self.phase {
            BatchPhase::Collecting => Ok(()),
            BatchPhase::Complete => Err(ScrubError::BatchAlreadyComplete {
                source_name: source_name.to_string(),
            }),
            BatchPhase::Empty => Err(ScrubError::BatchNotStarted {
                source_name: source_name.to_string(),
            }),
        }
    }

    fn record(&mut self, status: DocumentStatus) {
        let name = status.source_name().to_string();
        if self.outcomes.insert(name.clone(), status).is_some() {
            debug!("Outcome for '{}' replaced by a newer one.", name);
        }
        if self.outcomes.len() >= self.expected_count {
            self.phase = BatchPhase::Complete;
            info!(
                "Batch {} complete: {} document(s) recorded.",
                self.generation,
                self.outcomes.len()
            );
        }
    }

    /// Records a finished document. A later outcome for the same name
    /// replaces the earlier one.
    pub fn submit(&mut self, outcome: RedactionOutcome) -> Result<(), ScrubError> {
        self.ensure_collecting(&outcome.source_name)?;
        self.rule_files_referenced.insert(outcome.rule_file.clone());
        self.record(DocumentStatus::Processed(outcome));
        Ok(())
    }

    /// Records a document whose pipeline failed.
    pub fn submit_failure(&mut self, source_name: &str, error: &ScrubError) -> Result<(), ScrubError> {
        self.ensure_collecting(source_name)?;
        self.record(DocumentStatus::Failed(FailedDocument {
            source_name: source_name.to_string(),
            reason: error.to_string(),
        }));
        Ok(())
    }

    /// Like [`submit`](Self::submit) / [`submit_failure`](Self::submit_failure)
    /// but drops results from a superseded generation. Returns whether the
    /// result was recorded.
    pub fn accept(
        &mut self,
        generation: Generation,
        source_name: &str,
        result: Result<RedactionOutcome, ScrubError>,
    ) -> Result<bool, ScrubError> {
        if generation != self.generation {
            debug!(
                "Discarding result for '{}' from superseded batch {}.",
                source_name, generation
            );
            return Ok(false);
        }
        match result {
            Ok(outcome) => self.submit(outcome)?,
            Err(e) => self.submit_failure(source_name, &e)?,
        }
        Ok(true)
    }

    pub fn is_complete(&self) -> bool {
        self.phase == BatchPhase::Complete
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn expected_count(&self) -> usize {
        self.expected_count
    }

    /// All recorded entries, ordered by source name.
    pub fn statuses(&self) -> impl Iterator<Item = &DocumentStatus> {
        self.outcomes.values()
    }

    fn processed(&self) -> impl Iterator<Item = &RedactionOutcome> {
        self.outcomes.values().filter_map(|status| match status {
            DocumentStatus::Processed(outcome) => Some(outcome),
            DocumentStatus::Failed(_) => None,
        })
    }

    pub fn changed_outcomes(&self) -> Vec<&RedactionOutcome> {
        self.processed().filter(|o| o.changed).collect()
    }

    pub fn unchanged_outcomes(&self) -> Vec<&RedactionOutcome> {
        self.processed().filter(|o| !o.changed).collect()
    }

    pub fn failed_documents(&self) -> Vec<&FailedDocument> {
        self.outcomes
            .values()
            .filter_map(|status| match status {
                DocumentStatus::Failed(failed) => Some(failed),
                DocumentStatus::Processed(_) => None,
            })
            .collect()
    }

    /// Only changed documents are worth saving again.
    pub fn exportable_outcomes(&self) -> Vec<&RedactionOutcome> {
        self.changed_outcomes()
    }

    pub fn rule_files_referenced(&self) -> &BTreeSet<String> {
        &self.rule_files_referenced
    }
}

/// A document offered for a batch, before it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub source_name: String,
    pub size_bytes: u64,
}

/// Rejects batches that exceed the configured limits or repeat a file name.
pub fn validate_intake(inputs: &[BatchInput], config: &ScrubConfig) -> Result<(), ScrubError> {
    if inputs.len() > config.maximum_input_files {
        return Err(ScrubError::IntakeRejected(format!(
            "Cannot sanitize more than {} files at a time.",
            config.maximum_input_files
        )));
    }

    let max_bytes = config.maximum_input_file_size_bytes();
    let mut seen = HashSet::new();
    for input in inputs {
        if input.size_bytes > max_bytes {
            return Err(ScrubError::IntakeRejected(format!(
                "Size of file {} ({} MB) exceeds maximum supported file size of {} MB.",
                input.source_name,
                input.size_bytes / (1024 * 1024),
                config.maximum_input_file_size_mb
            )));
        }
        if !seen.insert(input.source_name.as_str()) {
            return Err(ScrubError::IntakeRejected(format!(
                "Multiple files with the same name ({}) aren't supported.",
                input.source_name
            )));
        }
    }
    Ok(())
}
