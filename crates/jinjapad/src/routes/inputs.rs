//! Fixture file endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::routes::params::FormParams;
use crate::state::AppState;

/// `GET /input-files`
pub async fn list_input_files(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.fixtures.list())
}

/// `GET /input-file-content?filename=...`
///
/// The file's bytes, unmodified.
pub async fn input_file_content(
    State(state): State<AppState>,
    params: FormParams,
) -> Result<Response, ApiError> {
    let bytes = state.fixtures.read(params.get("filename"))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        bytes,
    )
        .into_response())
}
