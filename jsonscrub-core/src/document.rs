//! The parsed input document and its declared kind.

use serde_json::Value;

use crate::errors::ScrubError;

/// One uploaded file's parsed content.
///
/// The content is never mutated once loaded; redaction works on a clone.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    source_name: String,
    kind: String,
    content: Value,
}

impl Document {
    /// Parses `text` as JSON. The kind is the final extension of `source_name`.
    pub fn parse(source_name: &str, text: &str) -> Result<Self, ScrubError> {
        let kind = document_kind(source_name).ok_or_else(|| ScrubError::MalformedDocument {
            source_name: source_name.to_string(),
            reason: "file name has no extension to derive a document kind from".to_string(),
        })?;
        let content: Value =
            serde_json::from_str(text).map_err(|e| ScrubError::MalformedDocument {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            source_name: source_name.to_string(),
            kind: kind.to_string(),
            content,
        })
    }

    /// Wraps an already parsed value.
    pub fn from_value(source_name: impl Into<String>, kind: impl Into<String>, content: Value) -> Self {
        Self {
            source_name: source_name.into(),
            kind: kind.into(),
            content,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn content(&self) -> &Value {
        &self.content
    }
}

/// Returns the final extension segment of a file name, if any.
///
/// Only the file name part counts, so `dir.v2/capture` has no kind.
pub fn document_kind(source_name: &str) -> Option<&str> {
    let file_name = source_name.rsplit(['/', '\\']).next().unwrap_or(source_name);
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => Some(&file_name[idx + 1..]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_is_final_extension() {
        assert_eq!(document_kind("github.com.har"), Some("har"));
        assert_eq!(document_kind("captures/trace.json"), Some("json"));
        assert_eq!(document_kind("no_extension"), None);
        assert_eq!(document_kind(".hidden"), None);
        assert_eq!(document_kind("dir.v2/capture"), None);
    }

    #[test]
    fn test_parse_keeps_key_order() {
        let doc = Document::parse("a.har", r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&String> = doc.content().as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(doc.kind(), "har");
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = Document::parse("broken.har", "{\"log\": ").unwrap_err();
        assert!(matches!(err, ScrubError::MalformedDocument { ref source_name, .. } if source_name == "broken.har"));
    }

    #[test]
    fn test_from_value() {
        let doc = Document::from_value("x.json", "json", json!({"a": 1}));
        assert_eq!(doc.content()["a"], 1);
    }
}
