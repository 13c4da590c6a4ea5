//! Render history endpoints.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::error::ApiError;
use crate::history::{ClearOutcome, HistoryEntry};
use crate::routes::params::FormParams;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct SizeResponse {
    pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaxSizeResponse {
    pub max_size: usize,
}

/// `GET /history`
///
/// All entries, oldest first, with `input` and `expr` decoded.
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.list())
}

/// `GET /history/size`
pub async fn history_size(State(state): State<AppState>) -> Json<SizeResponse> {
    Json(SizeResponse {
        size: state.history.size(),
    })
}

/// `GET /history/maxsize`
pub async fn history_max_size(State(state): State<AppState>) -> Json<MaxSizeResponse> {
    Json(MaxSizeResponse {
        max_size: state.history.max_size(),
    })
}

/// `POST /history/clear`
///
/// Removes the oldest `count` entries. A missing or non-numeric `count`
/// (negative numbers included) clears everything.
pub async fn clear_history(
    State(state): State<AppState>,
    params: FormParams,
) -> Result<Json<ClearOutcome>, ApiError> {
    let count = params
        .get("count")
        .and_then(|c| c.trim().parse::<usize>().ok());

    let outcome = state
        .history
        .clear(count)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("failed to write history")))?;
    Ok(Json(outcome))
}
