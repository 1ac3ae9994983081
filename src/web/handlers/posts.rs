//! Writing posts and comments.

use axum::{
    Form,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::application::services::PostInput;
use crate::domain::entities::{Post, User};
use crate::error::AppError;
use crate::state::AppState;
use crate::web::forms::{CommentForm, read_post_form};
use crate::web::middleware::session::{CurrentUser, Viewer};
use crate::web::views::{Layout, PostFormTemplate, PostFormValues, PostFormView};

use super::parse_post_id;

fn detail_path(post_id: i64) -> String {
    format!("/posts/{}", post_id)
}

fn form_values(input: &PostInput) -> PostFormValues {
    PostFormValues {
        text: input.text.clone(),
        group_id: input.group_id,
    }
}

/// `GET /create`
pub async fn create_form_handler(
    State(st): State<AppState>,
    viewer: Viewer,
) -> Result<PostFormTemplate, AppError> {
    let groups = st.post_service.list_groups().await?;
    Ok(PostFormTemplate {
        view: Layout::new(
            &viewer,
            PostFormView::create(&groups, PostFormValues::default(), Vec::new()),
        ),
    })
}

/// Publishes a post and sends the author to their profile. Invalid input
/// re-renders the form with the submitted values.
///
/// `POST /create` (multipart: `text`, `group`, `image`)
pub async fn create_handler(
    State(st): State<AppState>,
    CurrentUser(user): CurrentUser,
    viewer: Viewer,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let input = read_post_form(multipart).await?;
    let values = form_values(&input);

    match st.post_service.create_post(&user, input).await {
        Ok(_) => Ok(Redirect::to(&format!("/profile/{}", user.username)).into_response()),
        Err(AppError::Validation { message, .. }) => {
            let groups = st.post_service.list_groups().await?;
            Ok(PostFormTemplate {
                view: Layout::new(&viewer, PostFormView::create(&groups, values, vec![message])),
            }
            .into_response())
        }
        Err(e) => Err(e),
    }
}

/// Edit form, prefilled from the post. Non-authors are sent to the post.
///
/// `GET /posts/{post_id}/edit`
pub async fn edit_form_handler(
    State(st): State<AppState>,
    CurrentUser(user): CurrentUser,
    viewer: Viewer,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let post_id = parse_post_id(&post_id)?;

    let post = match st.post_service.post_for_edit(&user, post_id).await {
        Ok(post) => post,
        Err(AppError::Forbidden { .. }) => {
            return Ok(Redirect::to(&detail_path(post_id)).into_response());
        }
        Err(e) => return Err(e),
    };

    let values = PostFormValues {
        text: post.text.clone(),
        group_id: post.group_id(),
    };
    render_edit_form(&st, &viewer, &post, values, Vec::new()).await
}

/// `POST /posts/{post_id}/edit`
pub async fn edit_handler(
    State(st): State<AppState>,
    CurrentUser(user): CurrentUser,
    viewer: Viewer,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let input = read_post_form(multipart).await?;
    let values = form_values(&input);

    match st.post_service.edit_post(&user, post_id, input).await {
        Ok(post) => Ok(Redirect::to(&detail_path(post.id)).into_response()),
        Err(AppError::Forbidden { .. }) => Ok(Redirect::to(&detail_path(post_id)).into_response()),
        Err(AppError::Validation { message, .. }) => {
            let post = st.post_service.post_for_edit(&user, post_id).await?;
            render_edit_form(&st, &viewer, &post, values, vec![message]).await
        }
        Err(e) => Err(e),
    }
}

async fn render_edit_form(
    st: &AppState,
    viewer: &Viewer,
    post: &Post,
    values: PostFormValues,
    errors: Vec<String>,
) -> Result<Response, AppError> {
    let groups = st.post_service.list_groups().await?;
    Ok(PostFormTemplate {
        view: Layout::new(viewer, PostFormView::edit(post, &groups, values, errors)),
    }
    .into_response())
}

/// Adds a comment and returns to the post. A blank comment is dropped.
///
/// `POST /posts/{post_id}/comment`
pub async fn comment_handler(
    State(st): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, AppError> {
    let post_id = parse_post_id(&post_id)?;
    add_comment(&st, &user, post_id, &form.text).await?;
    Ok(Redirect::to(&detail_path(post_id)))
}

/// `GET /posts/{post_id}/comment`
pub async fn comment_redirect_handler(Path(post_id): Path<String>) -> Result<Redirect, AppError> {
    let post_id = parse_post_id(&post_id)?;
    Ok(Redirect::to(&detail_path(post_id)))
}

async fn add_comment(st: &AppState, user: &User, post_id: i64, text: &str) -> Result<(), AppError> {
    match st.comment_service.add_comment(user, post_id, text).await {
        Ok(_) => Ok(()),
        Err(AppError::Validation { message, .. }) => {
            tracing::debug!(post_id, "Comment rejected: {}", message);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
