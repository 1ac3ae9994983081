//! Login, sign-up and logout.

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use validator::Validate;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::next_url::safe_next;
use crate::web::forms::{LoginForm, NextQuery, SignupForm};
use crate::web::middleware::session::{SESSION_COOKIE, Viewer, session_token};
use crate::web::views::{AuthFormView, Layout, LoginTemplate, SignupTemplate};

/// Builds the `Set-Cookie` value for a session. `max_age` of zero clears it.
fn session_cookie(token: &str, max_age: i64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal("Invalid cookie value", json!({ "reason": e.to_string() })))
}

/// Opens a session for `username` and redirects to `next`.
async fn start_session(
    st: &AppState,
    username: &str,
    password: &str,
    next: Option<&str>,
) -> Result<Response, AppError> {
    let (_, token) = st.auth_service.login(username, password).await?;
    let max_age = st.settings.session_ttl_hours * 3600;
    let cookie = session_cookie(&token, max_age, st.settings.cookie_secure)?;

    let target = safe_next(next).unwrap_or("/");
    Ok(([(SET_COOKIE, cookie)], Redirect::to(target)).into_response())
}

/// `GET /auth/login?next=/path`
pub async fn login_form_handler(viewer: Viewer, Query(query): Query<NextQuery>) -> LoginTemplate {
    LoginTemplate {
        view: Layout::new(
            &viewer,
            AuthFormView::new("", safe_next(query.next.as_deref()), None),
        ),
    }
}

/// Checks credentials, sets the session cookie and follows `next`. Bad
/// credentials re-render the form.
///
/// `POST /auth/login`
pub async fn login_handler(
    State(st): State<AppState>,
    viewer: Viewer,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = form.next.as_deref().filter(|n| !n.is_empty());

    match start_session(&st, &form.username, &form.password, next).await {
        Ok(response) => Ok(response),
        Err(AppError::Unauthorized { message, .. }) => Ok(LoginTemplate {
            view: Layout::new(
                &viewer,
                AuthFormView::new(&form.username, safe_next(next), Some(message)),
            ),
        }
        .into_response()),
        Err(e) => Err(e),
    }
}

/// `GET /auth/signup`
pub async fn signup_form_handler(viewer: Viewer) -> SignupTemplate {
    SignupTemplate {
        view: Layout::new(&viewer, AuthFormView::new("", None, None)),
    }
}

/// Registers an account and logs it in.
///
/// `POST /auth/signup`
pub async fn signup_handler(
    State(st): State<AppState>,
    viewer: Viewer,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let result = match form.validate() {
        Ok(()) => st
            .auth_service
            .sign_up(&form.username, &form.password1)
            .await
            .map(|_| ()),
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => start_session(&st, &form.username, &form.password1, None).await,
        Err(AppError::Validation { message, .. }) | Err(AppError::Conflict { message, .. }) => {
            Ok(SignupTemplate {
                view: Layout::new(
                    &viewer,
                    AuthFormView::new(&form.username, None, Some(message)),
                ),
            }
            .into_response())
        }
        Err(e) => Err(e),
    }
}

/// Ends the session and clears the cookie.
///
/// `GET|POST /auth/logout`
pub async fn logout_handler(
    State(st): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        st.auth_service.logout(&token).await?;
    }

    let cookie = session_cookie("", 0, st.settings.cookie_secure)?;
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}
