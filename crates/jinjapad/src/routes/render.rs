//! Template rendering endpoint.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::render;
use crate::routes::params::FormParams;
use crate::state::AppState;

/// `POST /render` with `json` (input text) and `expr` (template).
///
/// Successful renders are appended to the history. A history write failure
/// is logged and does not fail the request.
pub async fn render_template(
    State(state): State<AppState>,
    params: FormParams,
) -> Result<Response, ApiError> {
    let input = params.get("json").unwrap_or_default();
    let expr = params.get("expr").unwrap_or_default();

    let rendered = render::render(state.evaluator.as_ref(), input, expr).inspect_err(|e| {
        tracing::debug!(error = %e, "render failed");
    })?;

    if let Err(e) = state.history.record(input, expr) {
        tracing::warn!(error = %e, path = %state.history.path().display(), "failed to record history entry");
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::HeaderName::from_static("x-result-type"),
                rendered.result_type.as_str(),
            ),
            (
                header::HeaderName::from_static("x-input-format"),
                rendered.input_format.as_str(),
            ),
        ],
        rendered.output,
    )
        .into_response())
}
