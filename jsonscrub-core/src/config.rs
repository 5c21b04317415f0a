//! Configuration management for `jsonscrub-core`.
//!
//! The engine does not hardcode which document kinds or actions exist. Both
//! sets, together with the replacement values and batch limits, are carried
//! by [`ScrubConfig`] and injected into the rule set, the action registry and
//! the batch intake check.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sentinel written over values removed by the `remove` action.
pub const DEFAULT_REMOVED_REPLACEMENT: &str = "<REMOVED>";

/// Prefix of the tokens produced by `contextual_replacement`.
pub const DEFAULT_SECRET_PREFIX: &str = "SECRET";

/// Top-level configuration consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrubConfig {
    /// Largest accepted input file, in megabytes.
    pub maximum_input_file_size_mb: u64,
    /// Largest number of files accepted in one batch.
    pub maximum_input_files: usize,
    /// Value written by the `remove` action.
    pub removed_secret_replacement: String,
    /// Prefix for `contextual_replacement` tokens.
    pub secret_prefix: String,
    /// Document kinds (file extensions) that have rule files.
    pub supported_file_extensions: Vec<String>,
    /// Actions enabled in the registry.
    pub supported_actions: Vec<String>,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            maximum_input_file_size_mb: 100,
            maximum_input_files: 10,
            removed_secret_replacement: DEFAULT_REMOVED_REPLACEMENT.to_string(),
            secret_prefix: DEFAULT_SECRET_PREFIX.to_string(),
            supported_file_extensions: vec!["har".to_string()],
            supported_actions: vec!["remove".to_string()],
        }
    }
}

impl ScrubConfig {
    /// Loads a configuration from a YAML (or JSON) file.
    ///
    /// Missing fields fall back to [`ScrubConfig::default`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!(
            "Loaded configuration: {} kind(s), {} action(s).",
            config.supported_file_extensions.len(),
            config.supported_actions.len()
        );
        Ok(config)
    }

    /// Parses and validates a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: ScrubConfig = serde_yml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.removed_secret_replacement.is_empty() {
            errors.push("`removed_secret_replacement` must not be empty.".to_string());
        }
        if self.secret_prefix.is_empty() {
            errors.push("`secret_prefix` must not be empty.".to_string());
        }
        if self.supported_file_extensions.is_empty() {
            errors.push("`supported_file_extensions` must list at least one kind.".to_string());
        }
        for kind in &self.supported_file_extensions {
            if kind.is_empty() || kind.contains('.') || kind.contains('/') {
                errors.push(format!("Invalid file extension '{}'.", kind));
            }
        }
        if self.maximum_input_files == 0 {
            errors.push("`maximum_input_files` must be greater than 0.".to_string());
        }
        if self.maximum_input_file_size_mb == 0 {
            errors.push("`maximum_input_file_size_mb` must be greater than 0.".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Configuration validation failed:\n{}", errors.join("\n")))
        }
    }

    /// True if `kind` has rules configured.
    pub fn supports_kind(&self, kind: &str) -> bool {
        self.supported_file_extensions.iter().any(|k| k == kind)
    }

    /// Maximum input size in bytes.
    pub fn maximum_input_file_size_bytes(&self) -> u64 {
        self.maximum_input_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Locations searched for `config.yaml` when no path is given explicitly.
pub fn config_candidate_paths() -> Vec<PathBuf> {
    let base_dirs = vec![
        dirs::home_dir().map(|p| p.join(".jsonscrub")),
        dirs::config_dir().map(|p| p.join("jsonscrub")),
        Some(PathBuf::from("./config")),
    ];

    base_dirs
        .into_iter()
        .flatten()
        .map(|dir| dir.join("config.yaml"))
        .collect()
}

/// Loads the explicit config if given, else the first candidate that exists,
/// else the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ScrubConfig> {
    if let Some(path) = explicit {
        return ScrubConfig::load_from_file(path);
    }
    match config_candidate_paths().into_iter().find(|p| p.is_file()) {
        Some(path) => ScrubConfig::load_from_file(path),
        None => {
            debug!("No configuration file found, using defaults.");
            Ok(ScrubConfig::default())
        }
    }
}
