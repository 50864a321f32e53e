//! JSON translation document parsing.

use serde_json::Value;

use crate::model::{
    MutableUnit,
    SnapshotBuilder,
};
use crate::source::SourceError;

/// Parses a flat JSON object and adds its entries to the unit of `locale`.
///
/// Strings are taken as they are; numbers and booleans are stored as their
/// JSON text. `null`, objects, arrays and empty keys are skipped with a
/// warning without failing the rest of the document.
///
/// Returns the number of entries added.
///
/// # Errors
/// Returns an error if `json` is not valid JSON or its root is not an object.
///
/// # Examples
/// ```
/// use translation_hub::input::json::parse_into;
/// use translation_hub::model::SnapshotBuilder;
///
/// let builder = SnapshotBuilder::new();
/// let added = parse_into(&builder, r#"{"hello": "Hello", "count": 3}"#, "en_us").unwrap();
///
/// assert_eq!(added, 2);
/// let snapshot = builder.build();
/// assert_eq!(snapshot.get("en_us").unwrap().get("count"), Some("3"));
/// ```
pub fn parse_into(
    builder: &SnapshotBuilder,
    json: &str,
    locale: &str,
) -> Result<usize, SourceError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(map) = value else {
        return Err(SourceError::NotAnObject(value_kind(&value)));
    };

    let unit = builder.unit(locale);
    Ok(add_entries(&unit, map, locale))
}

/// Adds every usable entry of `map` to `unit`.
fn add_entries(unit: &MutableUnit, map: serde_json::Map<String, Value>, locale: &str) -> usize {
    let mut added = 0;
    for (key, value) in map {
        if key.is_empty() {
            tracing::warn!(locale, "Skipping translation with an empty key");
            continue;
        }
        let text = match value {
            Value::String(text) => text,
            Value::Number(_) | Value::Bool(_) => value.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                tracing::warn!(
                    locale,
                    key = %key,
                    "Unexpected JSON value type '{}', skipping",
                    value_kind(&value)
                );
                continue;
            }
        };
        unit.add(key, text);
        added += 1;
    }
    added
}

/// Name of the JSON type of `value`.
const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[googletest::test]
    fn test_parse_simple() {
        let builder = SnapshotBuilder::new();

        let added = parse_into(&builder, r#"{"hello": "Hello", "bye": "Goodbye"}"#, "en_us").unwrap();

        expect_that!(added, eq(2));
        let snapshot = builder.build();
        let unit = snapshot.get("en_us").unwrap();
        assert_eq!(unit.get("hello"), Some("Hello"));
        assert_eq!(unit.get("bye"), Some("Goodbye"));
    }

    #[googletest::test]
    fn test_parse_skips_unsupported_values() {
        let builder = SnapshotBuilder::new();
        let json = r#"{
  "ok": "fine",
  "nested": { "a": "b" },
  "list": ["a"],
  "nothing": null,
  "": "empty key",
  "flag": true,
  "count": 42
}"#;

        let added = parse_into(&builder, json, "en_us").unwrap();

        expect_that!(added, eq(3));
        let snapshot = builder.build();
        let unit = snapshot.get("en_us").unwrap();
        assert_eq!(unit.get("ok"), Some("fine"));
        assert_eq!(unit.get("flag"), Some("true"));
        assert_eq!(unit.get("count"), Some("42"));
        expect_that!(unit.has("nested"), eq(false));
        expect_that!(unit.has("list"), eq(false));
        expect_that!(unit.has("nothing"), eq(false));
    }

    #[rstest]
    #[case::array("[1, 2]", "array")]
    #[case::string("\"text\"", "string")]
    #[case::number("1", "number")]
    fn test_parse_rejects_non_object_root(#[case] json: &str, #[case] kind: &str) {
        let builder = SnapshotBuilder::new();

        let result = parse_into(&builder, json, "en_us");

        assert!(matches!(result, Err(SourceError::NotAnObject(found)) if found == kind));
    }

    #[googletest::test]
    fn test_parse_invalid_json() {
        let builder = SnapshotBuilder::new();

        let result = parse_into(&builder, "invalid json", "en_us");

        expect_that!(matches!(result, Err(SourceError::Json(_))), eq(true));
        expect_that!(builder.is_empty(), eq(true));
    }

    #[googletest::test]
    fn test_parse_same_locale_twice_later_wins() {
        let builder = SnapshotBuilder::new();

        parse_into(&builder, r#"{"a": "first", "b": "B"}"#, "en_us").unwrap();
        parse_into(&builder, r#"{"a": "second"}"#, "en_us").unwrap();

        let snapshot = builder.build();
        let unit = snapshot.get("en_us").unwrap();
        assert_eq!(unit.get("a"), Some("second"));
        assert_eq!(unit.get("b"), Some("B"));
    }
}
