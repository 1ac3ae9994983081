//! Cookie-based sessions for the site.
//!
//! [`layer`] runs on every request. It resolves the `session_id` cookie to a
//! user and stores the result as a [`Viewer`] extension, so handlers can ask
//! who is looking without touching the database again. [`require_login`]
//! guards the routes that need an account.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::domain::entities::User;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::next_url::login_redirect;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_id";

/// The user behind the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<User>);

impl Viewer {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Viewer>().cloned().unwrap_or_default())
    }
}

/// Extractor for handlers that need a logged-in user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Viewer>()
            .and_then(|v| v.0.clone())
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized("Login required", json!({})))
    }
}

/// Reads the raw session token from the `Cookie` header.
///
/// Handles several cookies in one header; other cookies are ignored.
pub fn session_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(COOKIE)
        .and_then(|cookie_header| cookie_header.to_str().ok())
        .and_then(|cookie_str| {
            cookie_str.split(';').find_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                match (parts.next(), parts.next()) {
                    (Some(SESSION_COOKIE), Some(value)) if !value.is_empty() => {
                        Some(value.to_string())
                    }
                    _ => None,
                }
            })
        })
}

/// Resolves the session cookie and attaches a [`Viewer`] to the request.
///
/// A failed lookup is logged and the request continues anonymously.
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let user = match session_token(req.headers()) {
        Some(token) => match st.auth_service.resolve_session(&token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Session lookup failed: {}", e);
                None
            }
        },
        None => None,
    };

    req.extensions_mut().insert(Viewer(user));
    next.run(req).await
}

/// Redirects anonymous requests to the login page with a `next` parameter
/// pointing back at the requested path.
pub async fn require_login(req: Request, next: Next) -> Response {
    let authenticated = req
        .extensions()
        .get::<Viewer>()
        .is_some_and(Viewer::is_authenticated);

    if authenticated {
        return next.run(req).await;
    }

    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    Redirect::to(&login_redirect(target)).into_response()
}
