//! Settings endpoints.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::routes::params::FormParams;
use crate::settings::{Section, SettingsView};
use crate::state::AppState;

/// `GET /settings`
///
/// One section when `section` is given (empty if it does not exist),
/// otherwise every section keyed by name.
pub async fn get_settings(State(state): State<AppState>, params: FormParams) -> Json<SettingsView> {
    Json(state.settings.get(params.get("section")))
}

/// `POST /settings`
///
/// Merges every parameter other than `section` into that section and returns
/// `{ "<section>": { ...updated section... } }`.
pub async fn update_settings(
    State(state): State<AppState>,
    params: FormParams,
) -> Result<Json<BTreeMap<String, Section>>, ApiError> {
    let section = params.get("section").unwrap_or_default();
    let pairs = params.iter().filter(|(k, _)| *k != "section");

    let updated = state.settings.set(section, pairs)?;
    Ok(Json(BTreeMap::from([(section.trim().to_string(), updated)])))
}
