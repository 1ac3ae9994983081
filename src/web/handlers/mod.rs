//! Page handlers.

mod auth;
mod errors;
mod feeds;
mod follows;
mod media;
mod posts;

pub use auth::{
    login_form_handler, login_handler, logout_handler, signup_form_handler, signup_handler,
};
pub use errors::not_found_handler;
pub use feeds::{follow_index_handler, group_handler, index_handler, post_detail_handler, profile_handler};
pub use follows::{follow_handler, unfollow_handler};
pub use media::media_handler;
pub use posts::{
    comment_handler, comment_redirect_handler, create_form_handler, create_handler,
    edit_form_handler, edit_handler,
};

use serde_json::json;

use crate::error::AppError;

/// Parses a `{post_id}` path segment. Anything that is not an id cannot name
/// a post, so it is reported as not found.
pub(crate) fn parse_post_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::not_found("Post not found", json!({ "id": raw })))
}
