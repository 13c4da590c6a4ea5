//! Input format detection: strict JSON first, YAML as the fallback.
//!
//! JSON wins whenever both would parse, so `{"a":1}` is always reported as
//! JSON even though it is also valid YAML.

use std::fmt;

use minijinja::Value;

/// Detected input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    /// Tag sent in the `X-Input-Format` header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed input ready to be bound into a template.
#[derive(Debug, Clone)]
pub struct ParsedInput {
    pub format: InputFormat,
    pub value: Value,
}

/// Neither parser accepted the input.
#[derive(Debug, thiserror::Error)]
#[error("Input parsing error (tried JSON and YAML): {yaml} (JSON: {json})")]
pub struct FormatError {
    pub json: serde_json::Error,
    pub yaml: serde_yaml::Error,
}

/// Parse `text` as JSON, falling back to YAML.
///
/// A YAML document that is empty (or only whitespace and comments) yields an
/// empty mapping rather than null.
pub fn detect(text: &str) -> Result<ParsedInput, FormatError> {
    let json = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => {
            return Ok(ParsedInput {
                format: InputFormat::Json,
                value: Value::from_serialize(&value),
            });
        }
        Err(e) => e,
    };

    if is_blank_document(text) {
        return Ok(empty_mapping());
    }

    match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(serde_yaml::Value::Null) => Ok(empty_mapping()),
        Ok(value) => Ok(ParsedInput {
            format: InputFormat::Yaml,
            value: Value::from_serialize(&value),
        }),
        Err(yaml) => Err(FormatError { json, yaml }),
    }
}

fn empty_mapping() -> ParsedInput {
    ParsedInput {
        format: InputFormat::Yaml,
        value: Value::from_serialize(serde_yaml::Mapping::new()),
    }
}

/// Only blank lines and comments.
fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::value::ValueKind;

    #[test]
    fn json_object_is_json() {
        let parsed = detect(r#"{"a": 1, "b": [true, null]}"#).unwrap();
        assert_eq!(parsed.format, InputFormat::Json);
        assert_eq!(parsed.value.get_attr("a").unwrap(), Value::from(1));
    }

    #[test]
    fn json_scalars_are_json() {
        for text in ["1", "\"s\"", "true", "[1, 2]"] {
            assert_eq!(detect(text).unwrap().format, InputFormat::Json, "{text}");
        }
    }

    #[test]
    fn json_null_stays_null() {
        let parsed = detect("null").unwrap();
        assert_eq!(parsed.format, InputFormat::Json);
        assert_eq!(parsed.value.kind(), ValueKind::None);
    }

    #[test]
    fn yaml_mapping_is_yaml() {
        let parsed = detect("name: Test\nvalue: 123\nconfig:\n  port: 8080\n").unwrap();
        assert_eq!(parsed.format, InputFormat::Yaml);
        assert_eq!(parsed.value.get_attr("value").unwrap(), Value::from(123));
        let config = parsed.value.get_attr("config").unwrap();
        assert_eq!(config.get_attr("port").unwrap(), Value::from(8080));
    }

    #[test]
    fn plain_text_is_a_yaml_string() {
        let parsed = detect("This is just plain text").unwrap();
        assert_eq!(parsed.format, InputFormat::Yaml);
        assert_eq!(parsed.value.as_str(), Some("This is just plain text"));
    }

    #[test]
    fn empty_input_is_empty_mapping() {
        for text in ["", "   \n", "# just a comment\n"] {
            let parsed = detect(text).unwrap();
            assert_eq!(parsed.format, InputFormat::Yaml);
            assert_eq!(parsed.value.kind(), ValueKind::Map, "{text:?}");
            assert_eq!(parsed.value.len(), Some(0));
        }
    }

    #[test]
    fn invalid_in_both_names_both_formats() {
        let err = detect("{ invalid: [unclosed").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("JSON"));
        assert!(message.contains("YAML"));
    }

    #[test]
    fn format_tags() {
        assert_eq!(InputFormat::Json.to_string(), "JSON");
        assert_eq!(InputFormat::Yaml.as_str(), "YAML");
    }
}
