//! Feed and post detail pages.

use axum::{
    extract::{Path, Query, State},
    http::Uri,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::web::forms::PageQuery;
use crate::web::middleware::session::{CurrentUser, Viewer};
use crate::web::views::{
    FeedView, FollowTemplate, FollowView, GroupTemplate, GroupView, IndexTemplate,
    IndexView, Layout, PostDetailTemplate, PostDetailView, ProfileTemplate, ProfileView,
};

use super::parse_post_id;

/// Global feed. The feed fragment is cached per full path and query, so
/// every page number gets its own entry; the chrome is rendered per viewer.
///
/// # Endpoint
///
/// `GET /?page=N`
pub async fn index_handler(
    State(st): State<AppState>,
    viewer: Viewer,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Result<IndexTemplate, AppError> {
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();
    let page = query.page_request();
    let listing = &st.listing_service;

    let feed_html = st
        .page_cache
        .get_or_render(&key, move || async move {
            let posts = listing.global_feed(page).await?;
            FeedView::new(&posts, "/", "No posts yet.").into_html()
        })
        .await?;

    Ok(IndexTemplate {
        view: Layout::new(&viewer, IndexView { feed_html }),
    })
}

/// `GET /group/{slug}`
pub async fn group_handler(
    State(st): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<GroupTemplate, AppError> {
    let feed = st
        .listing_service
        .group_feed(&slug, query.page_request())
        .await?;

    Ok(GroupTemplate {
        view: Layout::new(&viewer, GroupView::new(&feed)?),
    })
}

/// `GET /profile/{username}`
pub async fn profile_handler(
    State(st): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<ProfileTemplate, AppError> {
    let feed = st
        .listing_service
        .author_feed(&username, viewer.user(), query.page_request())
        .await?;

    Ok(ProfileTemplate {
        view: Layout::new(&viewer, ProfileView::new(&feed, &viewer)?),
    })
}

/// Posts by the authors the current user follows.
///
/// `GET /follow`
pub async fn follow_index_handler(
    State(st): State<AppState>,
    CurrentUser(user): CurrentUser,
    viewer: Viewer,
    Query(query): Query<PageQuery>,
) -> Result<FollowTemplate, AppError> {
    let page = st
        .listing_service
        .follow_feed(&user, query.page_request())
        .await?;
    let authors = st
        .follow_service
        .followed_authors(user.id)
        .await?
        .into_iter()
        .map(|a| a.username)
        .collect();

    let content = FollowView {
        authors,
        feed_html: FeedView::new(&page, "/follow", "You are not following anyone with posts yet.")
            .into_html()?,
    };
    Ok(FollowTemplate {
        view: Layout::new(&viewer, content),
    })
}

/// `GET /posts/{post_id}`
pub async fn post_detail_handler(
    State(st): State<AppState>,
    viewer: Viewer,
    Path(post_id): Path<String>,
) -> Result<PostDetailTemplate, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let detail = st.listing_service.post_detail(post_id).await?;

    Ok(PostDetailTemplate {
        view: Layout::new(&viewer, PostDetailView::new(&detail, &viewer)),
    })
}
