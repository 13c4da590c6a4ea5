//! The render pipeline: detect the input format, evaluate the template,
//! classify the output.
//!
//! Output that parses as JSON is re-serialized pretty-printed and tagged
//! [`ResultType::Json`]; anything else is returned verbatim as
//! [`ResultType::String`].

pub mod engine;
pub mod filters;
pub mod format;

pub use engine::{EvalError, Evaluator, JinjaEvaluator};
pub use format::{FormatError, InputFormat, ParsedInput};

/// Classification of a render's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Json,
    String,
}

impl ResultType {
    /// Tag sent in the `X-Result-Type` header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::String => "string",
        }
    }
}

/// A successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub output: String,
    pub result_type: ResultType,
    pub input_format: InputFormat,
}

/// Why a render failed.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Input(#[from] FormatError),

    #[error("Jinja expression error: {0}")]
    Template(#[from] EvalError),
}

/// Parse `input`, evaluate `template` against it, classify the result.
pub fn render(
    evaluator: &dyn Evaluator,
    input: &str,
    template: &str,
) -> Result<RenderOutput, RenderError> {
    let parsed = format::detect(input)?;
    let rendered = evaluator.evaluate(template, parsed.value)?;

    let (output, result_type) = classify(rendered);
    tracing::debug!(
        input_format = %parsed.format,
        result_type = result_type.as_str(),
        bytes = output.len(),
        "template rendered"
    );

    Ok(RenderOutput {
        output,
        result_type,
        input_format: parsed.format,
    })
}

fn classify(rendered: String) -> (String, ResultType) {
    match serde_json::from_str::<serde_json::Value>(&rendered) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => (pretty, ResultType::Json),
            Err(_) => (rendered, ResultType::String),
        },
        Err(_) => (rendered, ResultType::String),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, template: &str) -> Result<RenderOutput, RenderError> {
        render(&JinjaEvaluator::new(), input, template)
    }

    #[test]
    fn test_number_output_is_json() {
        let out = run(r#"{"a":2}"#, "{{ data.a * 3 }}").unwrap();
        assert_eq!(out.output, "6");
        assert_eq!(out.result_type, ResultType::Json);
        assert_eq!(out.input_format, InputFormat::Json);
    }

    #[test]
    fn test_text_output_is_string() {
        let out = run("name: Test", "Hello {{ data.name }}!").unwrap();
        assert_eq!(out.output, "Hello Test!");
        assert_eq!(out.result_type, ResultType::String);
        assert_eq!(out.input_format, InputFormat::Yaml);
    }

    #[test]
    fn test_json_output_is_pretty_printed() {
        let out = run(r#"{"a":[1,2]}"#, "{{ data | to_json }}").unwrap();
        assert_eq!(out.output, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
        assert_eq!(out.result_type, ResultType::Json);
    }

    #[test]
    fn test_empty_input_binds_empty_mapping() {
        let out = run("", "{{ data | length }}").unwrap();
        assert_eq!(out.output, "0");
    }

    #[test]
    fn test_input_error_message() {
        let err = run("{ invalid: [unclosed", "{{ data }}").unwrap_err();
        assert!(matches!(err, RenderError::Input(_)));
        assert!(err.to_string().starts_with("Input parsing error"));
    }

    #[test]
    fn test_template_error_message() {
        let err = run("{}", "{{ data.x.y }}").unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
        assert!(err.to_string().starts_with("Jinja expression error: "));
    }

    #[test]
    fn test_json_key_order_is_preserved() {
        let input = r#"{"zeta":1,"alpha":2}"#;

        let out = run(input, "{% for k in data %}{{ k }},{% endfor %}").unwrap();
        assert_eq!(out.output, "zeta,alpha,");

        let out = run(input, "{{ data | to_json }}").unwrap();
        assert_eq!(out.output, "{\n  \"zeta\": 1,\n  \"alpha\": 2\n}");
    }

    #[test]
    fn test_yaml_key_order_is_preserved() {
        let out = run("zeta: 1\nalpha: 2\n", "{{ data | to_json }}").unwrap();
        assert_eq!(out.input_format, InputFormat::Yaml);
        assert_eq!(out.output, "{\n  \"zeta\": 1,\n  \"alpha\": 2\n}");
    }

    #[test]
    fn test_normalized_output_keeps_template_order() {
        let out = run("{}", r#"{"zeta": 1, "alpha": 2}"#).unwrap();
        assert_eq!(out.result_type, ResultType::Json);
        assert_eq!(out.output, "{\n  \"zeta\": 1,\n  \"alpha\": 2\n}");
    }

    #[test]
    fn test_boolean_output_is_string() {
        let out = run(r#"{"a":1}"#, "{{ data.a == 1 }}").unwrap();
        assert_eq!(out.output, "True");
        assert_eq!(out.result_type, ResultType::String);
    }

    #[test]
    fn test_quoted_string_output_is_json() {
        let out = run("{}", r#""quoted""#).unwrap();
        assert_eq!(out.output, r#""quoted""#);
        assert_eq!(out.result_type, ResultType::Json);
    }
}
