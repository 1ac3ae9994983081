//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - Public pages: feeds, post detail, media, logout
//! - `/auth/login`, `/auth/signup` - credential forms (rate limited)
//! - Protected pages: create/edit, comments, follows (cookie session required)
//! - `GET /health` - Health check: store, cache, media
//! - `/static/*` - Static assets
//! - anything else - 404 page
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Session** - Resolves the session cookie into a viewer for every request
//! - **Login gate** - Redirects anonymous users away from protected pages
//! - **Rate limiting** - Per-IP token bucket on credential submissions
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use crate::web;
use crate::web::handlers::not_found_handler;
use crate::web::middleware::session;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Builds the router without path normalization.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `rate_limited` - apply the per-IP limiter to the auth forms; it keys on
///   the peer address, so in-process test clients without `ConnectInfo`
///   turn it off
pub fn build_router(state: AppState, rate_limited: bool) -> Router {
    let protected = web::routes::protected_routes().route_layer(middleware::from_fn(
        session::require_login,
    ));

    let auth = if rate_limited {
        web::routes::auth_routes().layer(rate_limit::auth_layer())
    } else {
        web::routes::auth_routes()
    };

    Router::new()
        .merge(web::routes::public_routes())
        .merge(auth)
        .merge(protected)
        .route("/health", get(health_handler))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), session::layer))
        .layer(tracing::layer())
        .with_state(state)
}

/// Constructs the application router with all routes and middleware.
///
/// Trailing slashes are trimmed before routing, so `/group/cats/` and
/// `/group/cats` reach the same handler.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, true))
}
