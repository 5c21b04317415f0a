//! Change reporting: serialization, diff text and the per-document outcome.
//!
//! Both documents are serialized the same way (two-space indentation, keys in
//! the order they were encountered) so that unchanged input always produces
//! an empty diff. `changed` compares the serialized forms, never the rule hits.
//!
//! License: MIT OR APACHE 2.0

use diffy::create_patch;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::dispatcher::{BrokenPointer, RedactionPass, SkippedAction, UnresolvedRule};
use crate::document::Document;
use crate::errors::ScrubError;

/// Marker inserted before the extension of a sanitized file name.
pub const SANITIZED_MARKER: &str = "_sanitized";

/// A unified-diff capability.
pub trait DiffCapability: Send + Sync {
    fn unified_diff(&self, name_a: &str, name_b: &str, text_a: &str, text_b: &str) -> String;
}

/// Unified diff computed with `diffy`.
///
/// The `---`/`+++` header is always present, even when there are no hunks.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnifiedDiff;

fn with_trailing_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}

impl DiffCapability for UnifiedDiff {
    fn unified_diff(&self, name_a: &str, name_b: &str, text_a: &str, text_b: &str) -> String {
        let a = with_trailing_newline(text_a);
        let b = with_trailing_newline(text_b);
        let rendered = create_patch(&a, &b).to_string();
        // diffy names the sides "original"/"modified"; swap in the file names.
        let hunks = rendered.splitn(3, '\n').nth(2).unwrap_or("");
        format!("--- {}\n+++ {}\n{}", name_a, name_b, hunks)
    }
}

/// The recorded result of redacting one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedactionOutcome {
    pub source_name: String,
    pub sanitized_name: String,
    pub kind: String,
    pub rule_file: String,
    pub original_serialized: String,
    pub sanitized_serialized: String,
    pub diff_text: String,
    pub changed: bool,
    pub applied_count: usize,
    pub skipped_actions: Vec<SkippedAction>,
    pub broken_pointers: Vec<BrokenPointer>,
    pub unresolved_rules: Vec<UnresolvedRule>,
}

/// Deterministic pretty serialization used for both sides of the diff.
pub fn serialize_document(value: &Value) -> Result<String, ScrubError> {
    serde_json::to_string_pretty(value).map_err(|e| ScrubError::MalformedDocument {
        source_name: String::new(),
        reason: format!("failed to serialize document: {}", e),
    })
}

/// `a.b.har` becomes `a.b_sanitized.har`; names without an extension get the
/// marker appended.
pub fn sanitized_name(source_name: &str) -> String {
    let file_start = source_name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match source_name[file_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let split = file_start + dot;
            format!(
                "{}{}.{}",
                &source_name[..split],
                SANITIZED_MARKER,
                &source_name[split + 1..]
            )
        }
        _ => format!("{}{}", source_name, SANITIZED_MARKER),
    }
}

/// Builds [`RedactionOutcome`]s.
#[derive(Clone)]
pub struct ChangeReporter {
    diff: Arc<dyn DiffCapability>,
}

impl Default for ChangeReporter {
    fn default() -> Self {
        Self::new(Arc::new(UnifiedDiff))
    }
}

impl ChangeReporter {
    pub fn new(diff: Arc<dyn DiffCapability>) -> Self {
        Self { diff }
    }

    /// Compares `document` against the redacted copy carried by `pass`.
    pub fn report(
        &self,
        document: &Document,
        pass: RedactionPass,
        rule_file: &str,
    ) -> Result<RedactionOutcome, ScrubError> {
        let source_name = document.source_name();
        let with_name = |e: ScrubError| match e {
            ScrubError::MalformedDocument { reason, .. } => ScrubError::MalformedDocument {
                source_name: source_name.to_string(),
                reason,
            },
            other => other,
        };
        let original_serialized = serialize_document(document.content()).map_err(with_name)?;
        let sanitized_serialized = serialize_document(&pass.document).map_err(with_name)?;
        let sanitized_name = sanitized_name(source_name);
        let diff_text = self.diff.unified_diff(
            source_name,
            &sanitized_name,
            &original_serialized,
            &sanitized_serialized,
        );
        let changed = original_serialized != sanitized_serialized;

        Ok(RedactionOutcome {
            source_name: source_name.to_string(),
            sanitized_name,
            kind: document.kind().to_string(),
            rule_file: rule_file.to_string(),
            original_serialized,
            sanitized_serialized,
            diff_text,
            changed,
            applied_count: pass.applied_count,
            skipped_actions: pass.skipped_actions,
            broken_pointers: pass.broken_pointers,
            unresolved_rules: pass.unresolved_rules,
        })
    }
}
