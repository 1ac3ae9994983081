//! Site route tables.

use crate::state::AppState;
use crate::web::handlers::{
    comment_handler, comment_redirect_handler, create_form_handler, create_handler,
    edit_form_handler, edit_handler, follow_handler, follow_index_handler, group_handler,
    index_handler, login_form_handler, login_handler, logout_handler, media_handler,
    post_detail_handler, profile_handler, signup_form_handler, signup_handler, unfollow_handler,
};
use axum::{Router, routing::get};

/// Pages anyone can see.
///
/// # Endpoints
///
/// - `GET /` - Global feed
/// - `GET /group/{slug}` - Group feed
/// - `GET /profile/{username}` - Author feed
/// - `GET /posts/{post_id}` - Post with comments
/// - `GET /media/{*path}` - Uploaded images
/// - `GET|POST /auth/logout` - End the session
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/group/{slug}", get(group_handler))
        .route("/profile/{username}", get(profile_handler))
        .route("/posts/{post_id}", get(post_detail_handler))
        .route("/media/{*path}", get(media_handler))
        .route("/auth/logout", get(logout_handler).post(logout_handler))
}

/// Login and sign-up, kept apart so the router can rate limit them.
///
/// # Endpoints
///
/// - `GET|POST /auth/login`
/// - `GET|POST /auth/signup`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_form_handler).post(login_handler))
        .route("/auth/signup", get(signup_form_handler).post(signup_handler))
}

/// Pages requiring a logged-in user.
///
/// Guarded by [`crate::web::middleware::session::require_login`], which
/// sends anonymous visitors to the login page with `next` set.
///
/// # Endpoints
///
/// - `GET|POST /create`
/// - `GET|POST /posts/{post_id}/edit`
/// - `GET|POST /posts/{post_id}/comment`
/// - `GET /follow`
/// - `GET|POST /profile/{username}/follow`
/// - `GET|POST /profile/{username}/unfollow`
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/create", get(create_form_handler).post(create_handler))
        .route("/posts/{post_id}/edit", get(edit_form_handler).post(edit_handler))
        .route(
            "/posts/{post_id}/comment",
            get(comment_redirect_handler).post(comment_handler),
        )
        .route("/follow", get(follow_index_handler))
        .route("/profile/{username}/follow", get(follow_handler).post(follow_handler))
        .route(
            "/profile/{username}/unfollow",
            get(unfollow_handler).post(unfollow_handler),
        )
}
