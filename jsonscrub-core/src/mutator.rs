//! Pointer-addressed mutation of a document tree.
//!
//! A [`Pointer`] is the concrete location of one value. Traversal is driven by
//! the container actually found at each step: mappings are addressed by key,
//! sequences by a non-negative integer index. Anything else is a
//! `BrokenPointer`, which callers log and skip.

use serde_json::Value;
use std::fmt;

use crate::errors::ScrubError;

/// Ordered keys from the document root to one location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pointer {
    keys: Vec<String>,
}

impl Pointer {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// The root of the document.
    pub fn root() -> Self {
        Self::default()
    }

    /// Converts a root-relative, `/`-delimited pointer string into keys.
    ///
    /// The leading delimiter is stripped and `~1` / `~0` escapes are decoded.
    /// The empty string denotes the root.
    pub fn from_json_pointer(pointer: &str) -> Self {
        if pointer.is_empty() {
            return Self::root();
        }
        let trimmed = pointer.strip_prefix('/').unwrap_or(pointer);
        let keys = trimmed
            .split('/')
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .collect();
        Self { keys }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Pointer {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            write!(f, "/{}", key.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

fn broken(pointer: &Pointer, reason: String) -> ScrubError {
    ScrubError::BrokenPointer {
        pointer: pointer.to_string(),
        reason,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Sequence indices are `0` or digits without a leading zero.
fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse().ok()
}

/// Assigns `value` at `pointer`, mutating `document` in place.
///
/// Intermediate keys must exist. The final key of a mapping is inserted or
/// overwritten; the final index of a sequence must already exist.
pub fn set_at_pointer<'a>(
    document: &'a mut Value,
    pointer: &Pointer,
    value: Value,
) -> Result<&'a mut Value, ScrubError> {
    let Some((last, parents)) = pointer.keys.split_last() else {
        *document = value;
        return Ok(document);
    };

    let mut current: &mut Value = document;
    for key in parents {
        current = match current {
            Value::Object(map) => map
                .get_mut(key.as_str())
                .ok_or_else(|| broken(pointer, format!("mapping has no key '{}'", key)))?,
            Value::Array(items) => {
                let len = items.len();
                let index = parse_index(key)
                    .ok_or_else(|| broken(pointer, format!("'{}' is not a sequence index", key)))?;
                items.get_mut(index).ok_or_else(|| {
                    broken(pointer, format!("index {} is out of bounds (length {})", index, len))
                })?
            }
            other => {
                return Err(broken(
                    pointer,
                    format!("cannot descend into {} at key '{}'", describe(other), key),
                ))
            }
        };
    }

    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            map.get_mut(last.as_str())
                .ok_or_else(|| broken(pointer, format!("key '{}' vanished after insert", last)))
        }
        Value::Array(items) => {
            let len = items.len();
            let index = parse_index(last)
                .ok_or_else(|| broken(pointer, format!("'{}' is not a sequence index", last)))?;
            let slot = items.get_mut(index).ok_or_else(|| {
                broken(pointer, format!("index {} is out of bounds (length {})", index, len))
            })?;
            *slot = value;
            Ok(slot)
        }
        other => Err(broken(
            pointer,
            format!("cannot assign key '{}' on {}", last, describe(other)),
        )),
    }
}

/// Reads the value at `pointer`, if the location exists.
pub fn get_at_pointer<'a>(document: &'a Value, pointer: &Pointer) -> Option<&'a Value> {
    pointer.keys.iter().try_fold(document, |current, key| match current {
        Value::Object(map) => map.get(key.as_str()),
        Value::Array(items) => parse_index(key).and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ptr(keys: &[&str]) -> Pointer {
        keys.iter().copied().collect()
    }

    #[test]
    fn test_set_nested_mapping_value() {
        let mut doc = json!({"user": {"email": "a@b.com", "name": "A"}});
        set_at_pointer(&mut doc, &ptr(&["user", "email"]), json!("<REMOVED>")).unwrap();
        assert_eq!(doc, json!({"user": {"email": "<REMOVED>", "name": "A"}}));
    }

    #[test]
    fn test_set_through_sequence_index() {
        let mut doc = json!({"entries": [{"v": 1}, {"v": 2}]});
        set_at_pointer(&mut doc, &ptr(&["entries", "1", "v"]), json!(9)).unwrap();
        assert_eq!(doc["entries"][1]["v"], 9);
        assert_eq!(doc["entries"][0]["v"], 1);
    }

    #[test]
    fn test_leading_zero_index_is_broken_pointer() {
        let mut doc = json!({"entries": ["a", "b"]});
        let before = doc.clone();
        let err = set_at_pointer(&mut doc, &ptr(&["entries", "01"]), json!("x")).unwrap_err();
        assert!(matches!(err, ScrubError::BrokenPointer { .. }));
        assert_eq!(doc, before);
        assert_eq!(get_at_pointer(&doc, &ptr(&["entries", "01"])), None);
        assert_eq!(get_at_pointer(&doc, &ptr(&["entries", "0"])), Some(&json!("a")));
    }

    #[test]
    fn test_numeric_key_on_mapping_is_a_key() {
        let mut doc = json!({"codes": {"0": "x"}});
        set_at_pointer(&mut doc, &ptr(&["codes", "0"]), json!("y")).unwrap();
        assert_eq!(doc, json!({"codes": {"0": "y"}}));
    }

    #[test]
    fn test_null_container_is_broken_pointer() {
        let mut doc = json!({"user": null});
        let before = doc.clone();
        let err = set_at_pointer(&mut doc, &ptr(&["user", "email"]), json!("x")).unwrap_err();
        assert!(matches!(err, ScrubError::BrokenPointer { ref pointer, .. } if pointer == "/user/email"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_missing_intermediate_key_is_broken_pointer() {
        let mut doc = json!({"a": {}});
        let err = set_at_pointer(&mut doc, &ptr(&["a", "b", "c"]), json!(1)).unwrap_err();
        assert!(matches!(err, ScrubError::BrokenPointer { .. }));
    }

    #[test]
    fn test_out_of_bounds_and_non_index_on_sequence() {
        let mut doc = json!([1, 2]);
        assert!(set_at_pointer(&mut doc, &ptr(&["2"]), json!(0)).is_err());
        assert!(set_at_pointer(&mut doc, &ptr(&["first"]), json!(0)).is_err());
        assert!(set_at_pointer(&mut doc, &ptr(&["-1"]), json!(0)).is_err());
        assert_eq!(doc, json!([1, 2]));
    }

    #[test]
    fn test_final_key_is_inserted_on_mapping() {
        let mut doc = json!({"a": {}});
        set_at_pointer(&mut doc, &ptr(&["a", "new"]), json!(true)).unwrap();
        assert_eq!(doc, json!({"a": {"new": true}}));
    }

    #[test]
    fn test_root_pointer_replaces_document() {
        let mut doc = json!({"a": 1});
        set_at_pointer(&mut doc, &Pointer::root(), json!("gone")).unwrap();
        assert_eq!(doc, json!("gone"));
    }

    #[test]
    fn test_write_then_read_returns_written_value() {
        let cases = vec![
            (json!({"a": {"b": [0, {"c": 1}]}}), ptr(&["a", "b", "1", "c"])),
            (json!({"a": {"b": [0, {"c": 1}]}}), ptr(&["a", "b", "0"])),
            (json!({"a": 1}), ptr(&["a"])),
            (json!([[1]]), ptr(&["0", "0"])),
        ];
        for (mut doc, pointer) in cases {
            let written = json!({"nested": ["value"]});
            let returned = set_at_pointer(&mut doc, &pointer, written.clone()).unwrap().clone();
            assert_eq!(returned, written);
            assert_eq!(get_at_pointer(&doc, &pointer), Some(&written));
        }
    }

    #[test]
    fn test_json_pointer_round_trip_with_escapes() {
        let pointer = Pointer::from_json_pointer("/headers/a~1b/m~0n/0");
        assert_eq!(pointer.keys(), &["headers", "a/b", "m~n", "0"]);
        assert_eq!(pointer.to_string(), "/headers/a~1b/m~0n/0");
        assert!(Pointer::from_json_pointer("").is_root());
    }
}
