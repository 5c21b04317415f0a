// jsonscrub/src/ui/diff_viewer.rs
//! Terminal diff viewer for redacted documents.
//!
//! Renders the unified diff recorded on the outcome. Removed lines are red and
//! added lines green; colour is dropped when the output is not a terminal.

use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::Write;

use jsonscrub_core::RedactionOutcome;

/// Writes `outcome.diff_text`, colouring each line by its unified-diff prefix.
pub fn print_diff<W: Write>(
    outcome: &RedactionOutcome,
    writer: &mut W,
    supports_color: bool,
) -> Result<()> {
    for line in outcome.diff_text.lines() {
        if !supports_color {
            writeln!(writer, "{}", line)?;
        } else if line.starts_with("--- ") || line.starts_with("+++ ") {
            writeln!(writer, "{}", line.bold())?;
        } else if line.starts_with("@@") {
            writeln!(writer, "{}", line.cyan())?;
        } else if line.starts_with('-') {
            writeln!(writer, "{}", line.red())?;
        } else if line.starts_with('+') {
            writeln!(writer, "{}", line.green())?;
        } else {
            writeln!(writer, "{}", line)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonscrub_core::{headless_redact_string, EmbeddedRuleSource, ScrubConfig};
    use std::sync::Arc;

    fn redact(har: &str) -> RedactionOutcome {
        headless_redact_string(
            ScrubConfig::default(),
            Arc::new(EmbeddedRuleSource),
            "capture.har",
            har,
        )
        .unwrap()
    }

    #[test]
    fn test_plain_diff_marks_removed_and_added_lines() {
        let outcome =
            redact(r#"{"log": {"entries": [{"request": {"cookies": [{"name": "sid", "value": "abc123"}]}}]}}"#);

        let mut out = Vec::new();
        print_diff(&outcome, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("--- capture.har\n+++ capture_sanitized.har\n"));
        assert!(text
            .lines()
            .any(|l| l.starts_with('-') && l.ends_with("\"value\": \"abc123\"")));
        assert!(text
            .lines()
            .any(|l| l.starts_with('+') && l.ends_with("\"value\": \"<REMOVED>\"")));
    }

    #[test]
    fn test_prints_the_recorded_diff_text() {
        let mut outcome = redact(r#"{"log": {"entries": []}}"#);
        outcome.diff_text = "--- a.har\n+++ a_sanitized.har\n@@ -1 +1 @@\n-x\n+y\n".to_string();

        let mut out = Vec::new();
        print_diff(&outcome, &mut out, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), outcome.diff_text);
    }

    #[test]
    fn test_unchanged_document_prints_header_only() {
        let outcome = redact(r#"{"log": {"entries": []}}"#);
        assert!(!outcome.changed);

        let mut out = Vec::new();
        print_diff(&outcome, &mut out, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "--- capture.har\n+++ capture_sanitized.har\n"
        );
    }
}
