// jsonscrub/src/cli.rs
//! This file defines the command-line interface (CLI) for the jsonscrub application,
//! including all available commands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "jsonscrub",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact sensitive fields from JSON documents and HAR captures",
    long_about = "jsonscrub applies path-based redaction rules to JSON documents (HAR captures by default). Every matched field is replaced with a sentinel, a diff of each document is available for review, and only documents that actually changed are exported.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Path to a configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", global = true, help = "Path to a jsonscrub configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Directory holding `<kind>.yaml` rule files.
    #[arg(long = "rules-dir", value_name = "DIR", global = true, help = "Read rule files from this directory instead of the built-in rules.")]
    pub rules_dir: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `jsonscrub` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitizes a batch of documents.
    #[command(about = "Sanitizes a batch of documents and exports the ones that changed.")]
    Sanitize(SanitizeCommand),

    /// Lists the rules loaded for one or every supported kind.
    #[command(about = "Lists the redaction rules for one or every supported document kind.")]
    Rules(RulesCommand),
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug)]
pub struct SanitizeCommand {
    /// Documents to sanitize.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Where sanitized copies are written.
    #[arg(long = "out-dir", short = 'o', value_name = "DIR", default_value = ".", help = "Directory sanitized documents are written to.")]
    pub out_dir: PathBuf,

    /// Show a unified diff for every redacted document.
    #[arg(long, short = 'D', help = "Show a unified diff for every redacted document.")]
    pub diff: bool,

    /// Review only; nothing is written.
    #[arg(long = "no-export", help = "Do not write sanitized documents.")]
    pub no_export: bool,

    /// Print the batch result as JSON on stdout.
    #[arg(long, help = "Print the batch result as JSON on stdout.")]
    pub json: bool,
}

/// Arguments for the `rules` command.
#[derive(Parser, Debug)]
pub struct RulesCommand {
    /// Document kind (file extension); all supported kinds if omitted.
    #[arg(value_name = "KIND")]
    pub kind: Option<String>,
}
