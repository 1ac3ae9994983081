//! Application error type and its HTTP rendering.
//!
//! Every layer below the web boundary reports failures as [`AppError`]. The
//! boundary decides how each variant surfaces: error pages for `NotFound` and
//! `Internal`, redirects for `Unauthorized`, and so on.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::{Value, json};

use crate::infrastructure::cache::CacheError;
use crate::infrastructure::media::MediaError;

/// Login page used when an [`AppError::Unauthorized`] escapes a handler.
pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Unauthorized { message: String, details: Value },
    #[error("{message}")]
    Forbidden { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status this error maps to when rendered as a page.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Dedicated error page, shared by handler errors and the router fallback.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub title: String,
    pub message: String,
}

impl ErrorPage {
    pub fn not_found() -> Self {
        Self {
            status: 404,
            title: "Page not found".to_string(),
            message: "The page you requested does not exist.".to_string(),
        }
    }

    /// Renders the page, degrading to plain text if the template fails.
    pub fn into_html(self) -> Html<String> {
        match self.render() {
            Ok(body) => Html(body),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                Html(format!("{} {}", self.status, self.title))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let page = match self {
            AppError::Unauthorized { .. } => {
                return Redirect::to(LOGIN_PATH).into_response();
            }
            AppError::NotFound { .. } => ErrorPage::not_found(),
            AppError::Internal { message, details } => {
                tracing::error!(%details, "Internal error: {}", message);
                ErrorPage {
                    status: status.as_u16(),
                    title: "Server error".to_string(),
                    message: "Something went wrong. Please try again later.".to_string(),
                }
            }
            AppError::Validation { message, .. } => ErrorPage {
                status: status.as_u16(),
                title: "Bad request".to_string(),
                message,
            },
            AppError::Conflict { message, .. } => ErrorPage {
                status: status.as_u16(),
                title: "Conflict".to_string(),
                message,
            },
            AppError::Forbidden { message, .. } => ErrorPage {
                status: status.as_u16(),
                title: "Forbidden".to_string(),
                message,
            },
        };

        (status, page.into_html()).into_response()
    }
}

/// Maps database errors, turning unique violations into [`AppError::Conflict`].
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
        if db.is_check_violation() {
            return AppError::bad_request(
                "Check constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
    }

    tracing::error!("Database error: {}", e);
    AppError::internal("Database error", json!({}))
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        AppError::internal("Cache error", json!({ "reason": e.to_string() }))
    }
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::NotFound(path) => {
                AppError::not_found("Media file not found", json!({ "path": path }))
            }
            MediaError::InvalidPath(path) => {
                AppError::bad_request("Invalid media path", json!({ "path": path }))
            }
            other => AppError::internal("Media storage error", json!({ "reason": other.to_string() })),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = e.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| match &err.message {
                    Some(m) => m.to_string(),
                    None => format!("Invalid {}", field),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        let names: Vec<String> = fields.iter().map(|(f, _)| f.to_string()).collect();

        AppError::bad_request(message, json!({ "fields": names }))
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::internal("Template rendering failed", json!({ "reason": e.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::not_found("x", json!({})).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::conflict("x", json!({})).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::bad_request("x", json!({})).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::forbidden("x", json!({})).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_unauthorized_redirects_to_login() {
        let response = AppError::unauthorized("Login required", json!({})).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], LOGIN_PATH);
    }

    #[test]
    fn test_not_found_renders_error_page() {
        let response = AppError::not_found("Group not found", json!({})).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_display_uses_message() {
        let err = AppError::conflict("Already following", json!({}));
        assert_eq!(err.to_string(), "Already following");
    }

    #[test]
    fn test_media_not_found_maps_to_not_found() {
        let err: AppError = MediaError::NotFound("posts/x.gif".to_string()).into();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
