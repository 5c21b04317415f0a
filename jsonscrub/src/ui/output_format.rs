// jsonscrub/src/ui/output_format.rs
//! Status and message lines printed to stderr.
//!
//! Colour is applied only when the caller says the stream is a terminal, so
//! piped output and test captures stay plain.

use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::Write;

use jsonscrub_core::{DocumentStatus, RedactionOutcome};

pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> Result<()> {
    if supports_color {
        writeln!(writer, "{}", msg.cyan())?;
    } else {
        writeln!(writer, "{}", msg)?;
    }
    Ok(())
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> Result<()> {
    if supports_color {
        writeln!(writer, "{} {}", "Warning:".yellow().bold(), msg.yellow())?;
    } else {
        writeln!(writer, "Warning: {}", msg)?;
    }
    Ok(())
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> Result<()> {
    if supports_color {
        writeln!(writer, "{} {}", "Error:".red().bold(), msg.red())?;
    } else {
        writeln!(writer, "Error: {}", msg)?;
    }
    Ok(())
}

/// One line per document: `[redacted]`, `[untouched]` or `[failed]`, followed
/// by any diagnostics recorded while redacting it.
pub fn print_document_status<W: Write>(
    writer: &mut W,
    status: &DocumentStatus,
    supports_color: bool,
) -> Result<()> {
    match status {
        DocumentStatus::Processed(outcome) => {
            let label = if outcome.changed { "[redacted]" } else { "[untouched]" };
            let detail = format!(
                "{} ({} replacement(s), rules: {})",
                outcome.source_name, outcome.applied_count, outcome.rule_file
            );
            if supports_color {
                if outcome.changed {
                    writeln!(writer, "{} {}", label.green().bold(), detail)?;
                } else {
                    writeln!(writer, "{} {}", label.dimmed(), detail)?;
                }
            } else {
                writeln!(writer, "{} {}", label, detail)?;
            }
            print_diagnostics(writer, outcome, supports_color)?;
        }
        DocumentStatus::Failed(failed) => {
            if supports_color {
                writeln!(
                    writer,
                    "{} {}: {}",
                    "[failed]".red().bold(),
                    failed.source_name,
                    failed.reason
                )?;
            } else {
                writeln!(writer, "[failed] {}: {}", failed.source_name, failed.reason)?;
            }
        }
    }
    Ok(())
}

fn print_diagnostics<W: Write>(
    writer: &mut W,
    outcome: &RedactionOutcome,
    supports_color: bool,
) -> Result<()> {
    let mut notes = Vec::new();
    for skipped in &outcome.skipped_actions {
        notes.push(format!(
            "skipped unsupported action '{}' for {}",
            skipped.action, skipped.path_expression
        ));
    }
    for broken in &outcome.broken_pointers {
        notes.push(format!("could not apply '{}' at {}: {}", broken.action, broken.pointer, broken.reason));
    }
    for unresolved in &outcome.unresolved_rules {
        notes.push(format!("rule {} not evaluated: {}", unresolved.path_expression, unresolved.reason));
    }
    for note in notes {
        if supports_color {
            writeln!(writer, "    {}", note.yellow())?;
        } else {
            writeln!(writer, "    {}", note)?;
        }
    }
    Ok(())
}
