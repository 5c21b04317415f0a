//! `rules` command: shows the rule files the sanitizer would use.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::sync::Arc;

use jsonscrub_core::{ActionRegistry, RuleSet, RuleSource, ScrubConfig};

/// Prints every rule for `kind`, or for each supported kind when `None`.
///
/// Rules whose action is not enabled by `config` are flagged, since the
/// sanitizer will skip them.
pub fn run_rules<W: Write>(
    config: &ScrubConfig,
    rule_source: Arc<dyn RuleSource>,
    kind: Option<&str>,
    writer: &mut W,
) -> Result<()> {
    let kinds: Vec<String> = match kind {
        Some(kind) => {
            if !config.supports_kind(kind) {
                bail!(
                    "Unsupported document kind '{}'. Supported kinds are: {}",
                    kind,
                    config.supported_file_extensions.join(",")
                );
            }
            vec![kind.to_string()]
        }
        None => config.supported_file_extensions.clone(),
    };

    let rule_set = RuleSet::new(rule_source);
    let registry = ActionRegistry::from_config(config);

    for kind in &kinds {
        let rule_file = rule_set
            .load_rules(kind)
            .with_context(|| format!("Failed to load rules for '{}'", kind))?;
        writeln!(writer, "{} ({})", kind, rule_set.rule_file_path(kind))?;
        if let Some(description) = &rule_file.description {
            writeln!(writer, "  {}", description)?;
        }
        for rule in &rule_file.rules {
            let flag = if registry.supports(&rule.action) { "" } else { " [unsupported]" };
            writeln!(
                writer,
                "  {} -> {}{}  # {}",
                rule.path_expression, rule.action, flag, rule.description
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonscrub_core::EmbeddedRuleSource;

    #[test]
    fn test_lists_builtin_har_rules() -> Result<()> {
        let mut out = Vec::new();
        run_rules(&ScrubConfig::default(), Arc::new(EmbeddedRuleSource), None, &mut out)?;
        let text = String::from_utf8(out)?;
        assert!(text.starts_with("har (rules/har.yaml)\n"));
        assert!(text.contains("$.log.entries[*].request.cookies[*].value -> remove  # Request cookie values"));
        assert!(!text.contains("[unsupported]"));
        Ok(())
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut out = Vec::new();
        let result = run_rules(&ScrubConfig::default(), Arc::new(EmbeddedRuleSource), Some("xml"), &mut out);
        assert!(result.is_err());
    }
}
