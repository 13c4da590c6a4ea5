//! Route definitions.
//!
//! ## Routes
//!
//! - `GET /` - Front-end page
//! - `GET /history` - Decoded history entries, oldest first
//! - `GET /history/size` - `{size}`
//! - `GET /history/maxsize` - `{max_size}`
//! - `POST /history/clear` - Drop the oldest `count` entries (all without `count`)
//! - `GET /settings` - One section (`section=`) or all of them
//! - `POST /settings` - Merge keys into `section`
//! - `GET /input-files` - Fixture file names
//! - `GET /input-file-content` - Fixture bytes (`filename=`)
//! - `POST /render` - Evaluate `expr` against `json`
//!
//! Anything else, including a known path with the wrong method, is a 404.
//! Every response carries cache-disabling headers.

mod history;
mod home;
mod inputs;
pub mod params;
mod render;
mod settings;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};

use crate::error::ApiError;
use crate::state::AppState;

/// Every (method, path) the service answers.
pub const ROUTE_TABLE: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/history"),
    ("GET", "/history/size"),
    ("GET", "/history/maxsize"),
    ("POST", "/history/clear"),
    ("GET", "/settings"),
    ("POST", "/settings"),
    ("GET", "/input-files"),
    ("GET", "/input-file-content"),
    ("POST", "/render"),
];

/// Build the complete router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home_page))
        // History
        .route("/history", get(history::list_history))
        .route("/history/size", get(history::history_size))
        .route("/history/maxsize", get(history::history_max_size))
        .route("/history/clear", post(history::clear_history))
        // Settings
        .route(
            "/settings",
            get(settings::get_settings).post(settings::update_settings),
        )
        // Fixtures
        .route("/input-files", get(inputs::list_input_files))
        .route("/input-file-content", get(inputs::input_file_content))
        // Rendering
        .route("/render", post(render::render_template))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(middleware::map_response(add_no_cache_headers))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    ApiError::NotFound("Endpoint not found".to_string())
}

/// Disable caching on every response, errors included.
async fn add_no_cache_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}
