//! Uploaded image delivery.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, header::CONTENT_TYPE},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Returns stored bytes unchanged, typed by file extension.
///
/// `GET /media/{*path}`
pub async fn media_handler(
    State(st): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = st.media.read(&path).await?;

    let mut headers = HeaderMap::new();
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }

    Ok((headers, bytes))
}
