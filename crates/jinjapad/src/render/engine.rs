//! Sandboxed template evaluation.

use minijinja::{Environment, UndefinedBehavior, Value, context};

use super::filters;

/// A template evaluation failure, carrying the engine's own message.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<minijinja::Error> for EvalError {
    fn from(err: minijinja::Error) -> Self {
        // The display form carries kind and detail but not the source excerpt.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message }
    }
}

/// Evaluates a template against a data value bound to `data`.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, template: &str, data: Value) -> Result<String, EvalError>;
}

/// minijinja-backed evaluator.
///
/// Undefined names are errors, `trim_blocks` and `lstrip_blocks` are on, and
/// no loader is configured, so `include`/`import`/`extends` cannot reach the
/// filesystem. Python-style methods on strings, lists and dicts
/// (`.upper()`, `.items()`, ...) are available.
pub struct JinjaEvaluator {
    env: Environment<'static>,
}

impl JinjaEvaluator {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        filters::register(&mut env);
        Self { env }
    }
}

impl Default for JinjaEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for JinjaEvaluator {
    fn evaluate(&self, template: &str, data: Value) -> Result<String, EvalError> {
        Ok(self.env.render_str(template, context! { data => data })?)
    }
}
