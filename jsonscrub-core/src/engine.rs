// jsonscrub-core/src/engine.rs
//! Defines the `RedactionEngine` trait.
//!
//! The batch runner and the CLI only talk to this trait, so the per-document
//! pipeline can be swapped (or stubbed in tests) without touching them.
//!
//! License: MIT OR APACHE 2.0

use crate::config::ScrubConfig;
use crate::document::Document;
use crate::errors::ScrubError;
use crate::report::RedactionOutcome;

/// Redacts one document at a time.
pub trait RedactionEngine: Send + Sync {
    /// Runs rules for the document's kind and reports the result.
    ///
    /// Soft failures end up inside the outcome; an `Err` means this document
    /// could not be processed at all.
    fn redact_document(&self, document: &Document) -> Result<RedactionOutcome, ScrubError>;

    /// Parses `text` and redacts it.
    fn redact_text(&self, source_name: &str, text: &str) -> Result<RedactionOutcome, ScrubError> {
        let document = Document::parse(source_name, text)?;
        self.redact_document(&document)
    }

    /// The configuration the engine was built with.
    fn config(&self) -> &ScrubConfig;
}
