//! Follow and unfollow actions.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::web::middleware::session::CurrentUser;

fn profile_path(username: &str) -> String {
    format!("/profile/{}", username)
}

/// Follows `username` and returns to their profile. Repeated follows and
/// following yourself change nothing.
///
/// `GET|POST /profile/{username}/follow`
pub async fn follow_handler(
    State(st): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Redirect, AppError> {
    match st.follow_service.follow(&user, &username).await {
        Ok(_) | Err(AppError::Conflict { .. }) | Err(AppError::Validation { .. }) => {
            Ok(Redirect::to(&profile_path(&username)))
        }
        Err(e) => Err(e),
    }
}

/// `GET|POST /profile/{username}/unfollow`
pub async fn unfollow_handler(
    State(st): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Redirect, AppError> {
    st.follow_service.unfollow(&user, &username).await?;
    Ok(Redirect::to(&profile_path(&username)))
}
