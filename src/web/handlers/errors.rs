//! Router fallback.

use axum::{http::StatusCode, response::IntoResponse};

use crate::error::ErrorPage;

/// Renders the 404 page for any unmatched route.
pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, ErrorPage::not_found().into_html())
}
