// jsonscrub-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::fs;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

use jsonscrub_core::config::{self, ScrubConfig};
use jsonscrub_core::rules::{DirRuleSource, RuleSet};
use jsonscrub_core::ScrubError;
use std::sync::Arc;

#[test]
fn test_load_config_from_file() -> Result<()> {
    let yaml_content = r#"
maximum_input_file_size_mb: 5
maximum_input_files: 3
removed_secret_replacement: "[GONE]"
supported_file_extensions: ["har", "json"]
supported_actions: ["remove", "contextual_replacement"]
"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml_content.as_bytes())?;
    let config = ScrubConfig::load_from_file(file.path())?;
    assert_eq!(config.maximum_input_file_size_mb, 5);
    assert_eq!(config.maximum_input_files, 3);
    assert_eq!(config.removed_secret_replacement, "[GONE]");
    // Omitted fields fall back to their defaults.
    assert_eq!(config.secret_prefix, config::DEFAULT_SECRET_PREFIX);
    assert!(config.supports_kind("json"));
    Ok(())
}

#[test]
fn test_load_config_rejects_invalid_values() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"maximum_input_files: 0\nsupported_file_extensions: []\n")?;
    let err = ScrubConfig::load_from_file(file.path()).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("maximum_input_files"), "{}", message);
    Ok(())
}

#[test]
fn test_load_config_explicit_missing_file_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(config::load_config(Some(&missing)).is_err());
}

#[test]
fn test_dir_rule_source_reads_kind_file() -> Result<()> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("json.yaml"),
        "description: test\nformat: json\nrules:\n  \"$.token\":\n    action: remove\n    description: Token\n",
    )?;
    let rule_set = RuleSet::new(Arc::new(DirRuleSource::new(dir.path())));
    let failures = rule_set.preload(&["json", "har"]);

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "har");
    let rules = rule_set.get_rules("json")?;
    assert_eq!(rules.rules.len(), 1);
    assert_eq!(rules.rules[0].path_expression, "$.token");
    assert!(rule_set.rule_file_path("json").ends_with("json.yaml"));
    assert!(matches!(
        rule_set.get_rules("har"),
        Err(ScrubError::RulesUnavailable { .. })
    ));
    Ok(())
}

#[test]
fn test_malformed_rule_file_is_reported() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("json.yaml"), "description: no rules here\n")?;
    let rule_set = RuleSet::new(Arc::new(DirRuleSource::new(dir.path())));
    assert!(matches!(
        rule_set.load_rules("json"),
        Err(ScrubError::RuleFile { .. })
    ));
    Ok(())
}
