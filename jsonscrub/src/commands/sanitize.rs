//! `sanitize` command: loads files from disk, runs them as one batch and
//! exports the documents that changed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use is_terminal::IsTerminal;
use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsonscrub_core::batch::Generation;
use jsonscrub_core::{
    export_outcomes, run_batch, BatchCoordinator, BatchInput, DocumentLoader, DocumentStatus,
    ExportSink, RedactionEngine, Redactor, RuleSet, RuleSource, ScrubConfig, ScrubError,
};

use crate::ui::{diff_viewer, output_format};

/// Options for [`run_sanitize`].
pub struct SanitizeOptions {
    pub files: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub diff: bool,
    pub export: bool,
    pub json: bool,
    pub quiet: bool,
}

/// Result of a sanitize run, for the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeReport {
    pub redacted: usize,
    pub untouched: usize,
    pub failed: usize,
    pub exported: usize,
}

/// Reads documents from the file system.
pub struct FsLoader {
    paths: HashMap<String, PathBuf>,
}

#[async_trait]
impl DocumentLoader for FsLoader {
    async fn load(&self, input: &BatchInput) -> Result<String, ScrubError> {
        let path = self.paths.get(&input.source_name).ok_or_else(|| ScrubError::Load {
            source_name: input.source_name.clone(),
            reason: "no such input".to_string(),
        })?;
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScrubError::Load {
                source_name: input.source_name.clone(),
                reason: e.to_string(),
            })
    }
}

/// Writes exported documents into a directory, creating it on first use.
pub struct DirExportSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirExportSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ExportSink for DirExportSink {
    fn save(&mut self, sanitized_name: &str, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory {}", self.dir.display()))?;
        let path = self.dir.join(sanitized_name);
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Exported {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

#[derive(Serialize)]
struct BatchSummary<'a> {
    generation: Generation,
    documents: Vec<&'a DocumentStatus>,
    rule_files: &'a BTreeSet<String>,
}

/// Builds batch inputs from paths. The source name is the file name; sizes
/// come from metadata, and unreadable paths are left for the loader to fail.
async fn collect_inputs(files: &[PathBuf]) -> (Vec<BatchInput>, FsLoader) {
    let mut inputs = Vec::with_capacity(files.len());
    let mut paths = HashMap::new();
    for path in files {
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size_bytes = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!("No metadata for {}: {}", path.display(), e);
                0
            }
        };
        inputs.push(BatchInput {
            source_name: source_name.clone(),
            size_bytes,
        });
        paths.insert(source_name, path.clone());
    }
    (inputs, FsLoader { paths })
}

/// Runs one batch over `opts.files`.
pub async fn run_sanitize(
    config: ScrubConfig,
    rule_source: Arc<dyn RuleSource>,
    opts: SanitizeOptions,
) -> Result<SanitizeReport> {
    info!("Starting sanitize run over {} file(s).", opts.files.len());
    let stderr_supports_color = io::stderr().is_terminal();

    let rule_set = Arc::new(RuleSet::new(rule_source));
    for (kind, e) in rule_set.preload(&config.supported_file_extensions) {
        if !opts.quiet {
            output_format::print_warn_message(
                &mut io::stderr(),
                &format!("No rules for '{}' files: {}", kind, e),
                stderr_supports_color,
            )?;
        }
    }
    let engine: Arc<dyn RedactionEngine> = Arc::new(Redactor::new(config, rule_set));

    let (inputs, loader) = collect_inputs(&opts.files).await;
    let mut coordinator = BatchCoordinator::new();
    run_batch(engine, Arc::new(loader), &mut coordinator, inputs)
        .await
        .context("Sanitization failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stdout_supports_color = stdout.is_terminal();

    if opts.json {
        let summary = BatchSummary {
            generation: coordinator.generation(),
            documents: coordinator.statuses().collect(),
            rule_files: coordinator.rule_files_referenced(),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    }

    if !opts.quiet {
        let mut err = io::stderr();
        for status in coordinator.statuses() {
            output_format::print_document_status(&mut err, status, stderr_supports_color)?;
        }
    }

    if opts.diff {
        for outcome in coordinator.changed_outcomes() {
            diff_viewer::print_diff(outcome, &mut out, stdout_supports_color)?;
        }
    }

    let exported = if opts.export {
        let mut sink = DirExportSink::new(&opts.out_dir);
        let count = export_outcomes(&coordinator, &mut sink)?;
        if !opts.quiet {
            for path in sink.written() {
                output_format::print_info_message(
                    &mut io::stderr(),
                    &format!("Wrote {}", path.display()),
                    stderr_supports_color,
                )?;
            }
        }
        count
    } else {
        0
    };

    let report = SanitizeReport {
        redacted: coordinator.changed_outcomes().len(),
        untouched: coordinator.unchanged_outcomes().len(),
        failed: coordinator.failed_documents().len(),
        exported,
    };
    info!(
        "Sanitize run finished: {} redacted, {} untouched, {} failed, {} exported.",
        report.redacted, report.untouched, report.failed, report.exported
    );
    Ok(report)
}
