//! errors.rs - Custom error types for the jsonscrub-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! Soft failures (`UnsupportedAction`, `BrokenPointer`) are recorded as
//! diagnostics by the dispatcher; the rest abort at most one document.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// All error kinds produced by the `jsonscrub-core` library.
///
/// `#[non_exhaustive]` so new variants can land without breaking matches
/// in downstream crates.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrubError {
    #[error("No rules loaded for document kind '{kind}'")]
    RulesUnavailable { kind: String },

    #[error("Unsupported document kind '{kind}'. Supported kinds are: {supported}")]
    UnsupportedKind { kind: String, supported: String },

    #[error("Unsupported action '{action}' in rule '{path_expression}'")]
    UnsupportedAction {
        action: String,
        path_expression: String,
    },

    #[error("Pointer '{pointer}' does not match the document structure: {reason}")]
    BrokenPointer { pointer: String, reason: String },

    #[error("Failed to parse '{source_name}': {reason}")]
    MalformedDocument { source_name: String, reason: String },

    #[error("Path expression '{path_expression}' could not be evaluated: {reason}")]
    PathQuery {
        path_expression: String,
        reason: String,
    },

    #[error("Failed to load rule file '{path}': {reason}")]
    RuleFile { path: String, reason: String },

    #[error("Failed to load '{source_name}': {reason}")]
    Load { source_name: String, reason: String },

    #[error("Processing of '{source_name}' stopped before it reported: {reason}")]
    TaskFailed { source_name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Batch rejected: {0}")]
    IntakeRejected(String),

    #[error("Batch is already complete; reset it before submitting '{source_name}'")]
    BatchAlreadyComplete { source_name: String },

    #[error("No batch in progress; begin a batch before submitting '{source_name}'")]
    BatchNotStarted { source_name: String },

    #[error("An unexpected I/O error occurred: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrubError {
    /// True for failures that abort only one document's pipeline.
    pub fn is_document_failure(&self) -> bool {
        matches!(
            self,
            ScrubError::RulesUnavailable { .. }
                | ScrubError::UnsupportedKind { .. }
                | ScrubError::MalformedDocument { .. }
                | ScrubError::Load { .. }
                | ScrubError::TaskFailed { .. }
        )
    }
}
