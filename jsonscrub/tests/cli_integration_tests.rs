// jsonscrub/tests/cli_integration_tests.rs
//! Command-line integration tests for the `jsonscrub` binary.
//!
//! Inputs, rule directories and output directories live in `tempfile`
//! directories so tests leave nothing behind. Output is passed through
//! `strip_ansi_escapes` before assertions.

use anyhow::Result;
#[allow(unused_imports)]
use assert_cmd::prelude::*;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use strip_ansi_escapes::strip as strip_ansi_escapes_fn;

const CAPTURE_HAR: &str = r#"{
  "log": {
    "entries": [
      {
        "request": {
          "headers": [{"name": "Authorization", "value": "Bearer abc.def"}],
          "cookies": [{"name": "sid", "value": "s3cr3t"}]
        },
        "response": {"headers": [], "cookies": []}
      }
    ]
  }
}"#;

const CLEAN_HAR: &str = r#"{"log": {"entries": []}}"#;

fn jsonscrub() -> Command {
    let mut cmd = Command::cargo_bin("jsonscrub").unwrap();
    cmd.env("RUST_LOG", "debug");
    cmd.env_remove("JSONSCRUB_ALLOW_DEBUG_PII");
    cmd
}

fn strip_ansi(bytes: &[u8]) -> String {
    let cleaned = strip_ansi_escapes_fn(bytes);
    String::from_utf8_lossy(&cleaned).to_string()
}

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_sanitize_exports_only_changed_documents() -> Result<()> {
    let input_dir = tempdir()?;
    let out_dir = tempdir()?;
    let capture = write_file(input_dir.path(), "capture.har", CAPTURE_HAR);
    let clean = write_file(input_dir.path(), "clean.har", CLEAN_HAR);

    let assert = jsonscrub()
        .args(["sanitize", capture.as_str(), clean.as_str(), "--out-dir"])
        .arg(out_dir.path())
        .assert()
        .success();
    let stderr = strip_ansi(&assert.get_output().stderr);
    assert!(stderr.contains("[redacted] capture.har (2 replacement(s)"), "{}", stderr);
    assert!(stderr.contains("[untouched] clean.har"), "{}", stderr);

    let exported = fs::read_to_string(out_dir.path().join("capture_sanitized.har"))?;
    assert!(exported.contains("<REMOVED>"));
    assert!(!exported.contains("s3cr3t"));
    assert!(!exported.contains("Bearer abc.def"));
    assert!(!out_dir.path().join("clean_sanitized.har").exists());
    Ok(())
}

#[test]
fn test_sanitize_diff_shows_file_names_and_changes() -> Result<()> {
    let input_dir = tempdir()?;
    let capture = write_file(input_dir.path(), "capture.har", CAPTURE_HAR);

    let assert = jsonscrub()
        .args(["sanitize", capture.as_str(), "--diff", "--no-export"])
        .assert()
        .success();
    let stdout = strip_ansi(&assert.get_output().stdout);
    assert!(stdout.starts_with("--- capture.har\n+++ capture_sanitized.har\n"), "{}", stdout);
    assert!(stdout.lines().any(|l| l.starts_with('-') && l.contains("s3cr3t")));
    assert!(stdout.lines().any(|l| l.starts_with('+') && l.contains("<REMOVED>")));
    Ok(())
}

#[test]
fn test_sanitize_json_summary() -> Result<()> {
    let input_dir = tempdir()?;
    let capture = write_file(input_dir.path(), "capture.har", CAPTURE_HAR);

    let assert = jsonscrub()
        .args(["--quiet", "sanitize", capture.as_str(), "--json", "--no-export"])
        .assert()
        .success();
    let summary: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(summary["documents"][0]["status"], "processed");
    assert_eq!(summary["documents"][0]["changed"], true);
    assert_eq!(summary["rule_files"][0], "rules/har.yaml");
    Ok(())
}

#[test]
fn test_malformed_document_fails_without_stopping_batch() -> Result<()> {
    let input_dir = tempdir()?;
    let out_dir = tempdir()?;
    let broken = write_file(input_dir.path(), "broken.har", "{\"log\": ");
    let capture = write_file(input_dir.path(), "capture.har", CAPTURE_HAR);

    jsonscrub()
        .args(["sanitize", broken.as_str(), capture.as_str(), "--out-dir"])
        .arg(out_dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[failed] broken.har"));
    assert!(out_dir.path().join("capture_sanitized.har").exists());
    Ok(())
}

#[test]
fn test_intake_limit_from_config_rejects_batch() -> Result<()> {
    let input_dir = tempdir()?;
    let config = write_file(input_dir.path(), "config.yaml", "maximum_input_files: 1\n");
    let a = write_file(input_dir.path(), "a.har", CLEAN_HAR);
    let b = write_file(input_dir.path(), "b.har", CLEAN_HAR);

    jsonscrub()
        .args(["--config", config.as_str(), "sanitize", a.as_str(), b.as_str(), "--no-export"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot sanitize more than 1 files at a time."));
    Ok(())
}

#[test]
fn test_custom_rules_dir_and_kind() -> Result<()> {
    let dir = tempdir()?;
    let rules_dir = dir.path().join("rules");
    fs::create_dir(&rules_dir)?;
    fs::write(
        rules_dir.join("json.yaml"),
        "rules:\n  \"$.user.email\":\n    action: remove\n    description: Email\n  \"$.user.name\":\n    action: mask\n    description: Name\n",
    )?;
    let config = write_file(dir.path(), "config.yaml", "supported_file_extensions: [json]\n");
    let user = write_file(dir.path(), "user.json", r#"{"user":{"email":"a@b.com","name":"A"}}"#);

    let assert = jsonscrub()
        .args(["--config", config.as_str(), "--rules-dir"])
        .arg(&rules_dir)
        .args(["sanitize", user.as_str(), "--out-dir"])
        .arg(dir.path().join("out"))
        .assert()
        .success();
    let stderr = strip_ansi(&assert.get_output().stderr);
    assert!(stderr.contains("skipped unsupported action 'mask'"), "{}", stderr);

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out").join("user_sanitized.json"))?)?;
    assert_eq!(exported, serde_json::json!({"user": {"email": "<REMOVED>", "name": "A"}}));
    Ok(())
}

#[test]
fn test_rules_command_lists_builtin_rules() {
    jsonscrub()
        .args(["rules", "har"])
        .assert()
        .success()
        .stdout(predicate::str::contains("har (rules/har.yaml)"))
        .stdout(predicate::str::contains("$.log.entries[*].request.cookies[*].value -> remove"));
}

#[test]
fn test_rules_command_rejects_unknown_kind() {
    jsonscrub()
        .args(["rules", "xml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported document kind 'xml'"));
}
