//! Debug logging of individual replacements without leaking the values.
//!
//! Original values are masked in logs unless `JSONSCRUB_ALLOW_DEBUG_PII=true`.

use lazy_static::lazy_static;
use log::debug;
use serde_json::Value;

lazy_static! {
    /// Read once: whether original values may appear in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("JSONSCRUB_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn loggable(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if *PII_DEBUG_ALLOWED {
        text
    } else {
        redact_sensitive(&text)
    }
}

pub fn log_replacement_debug(action: &str, pointer: &str, original: &Value, replacement: &Value) {
    debug!(
        "{} \"{}\": original='{}', replacement='{}'",
        action,
        pointer,
        loggable(original),
        replacement
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]".to_string());
    }
}
