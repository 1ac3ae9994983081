//! View models and page templates.
//!
//! Every page gets an explicit view struct wrapped in a [`Layout`] that
//! carries the navigation chrome. The chrome depends on the viewer; the
//! content structs do not, which is what lets the global feed fragment be
//! cached and shared between viewers.

use askama::Template;
use askama_web::WebTemplate;

use crate::application::pagination::{Page, PageInfo};
use crate::application::services::{AuthorFeed, GroupFeed, PostDetail};
use crate::domain::entities::{Comment, Group, Post};
use crate::error::AppError;
use crate::web::middleware::session::Viewer;

const DATE_FORMAT: &str = "%d %b %Y";

/// Navigation bar state for the current viewer.
#[derive(Debug, Clone)]
pub struct NavView {
    pub logged_in: bool,
    pub username: String,
}

impl NavView {
    pub fn for_viewer(viewer: &Viewer) -> Self {
        match viewer.user() {
            Some(user) => Self {
                logged_in: true,
                username: user.username.clone(),
            },
            None => Self {
                logged_in: false,
                username: String::new(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout<T> {
    pub nav: NavView,
    pub content: T,
}

impl<T> Layout<T> {
    pub fn new(viewer: &Viewer, content: T) -> Self {
        Self {
            nav: NavView::for_viewer(viewer),
            content,
        }
    }
}

/// A post as it appears in feeds and on its detail page.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub preview: String,
    pub author_username: String,
    pub has_group: bool,
    pub group_slug: String,
    pub group_title: String,
    pub has_image: bool,
    pub image_url: String,
    pub published: String,
    pub iso_date: String,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        let (group_slug, group_title) = post
            .group
            .as_ref()
            .map(|g| (g.slug.clone(), g.title.clone()))
            .unwrap_or_default();
        let image_url = post
            .image
            .as_ref()
            .map(|path| format!("/media/{}", path))
            .unwrap_or_default();

        Self {
            id: post.id,
            text: post.text.clone(),
            preview: post.to_string(),
            author_username: post.author_username.clone(),
            has_group: post.group.is_some(),
            group_slug,
            group_title,
            has_image: post.image.is_some(),
            image_url,
            published: post.created_at.format(DATE_FORMAT).to_string(),
            iso_date: post.created_at.to_rfc3339(),
        }
    }
}

/// Paginator links. `base_path` is the feed URL without a query.
#[derive(Debug, Clone)]
pub struct PaginationView {
    pub base_path: String,
    pub number: u32,
    pub num_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_number: u32,
    pub next_number: u32,
    pub show: bool,
}

impl PaginationView {
    pub fn new(info: &PageInfo, base_path: &str) -> Self {
        Self {
            base_path: base_path.to_string(),
            number: info.number,
            num_pages: info.num_pages,
            has_previous: info.has_previous(),
            has_next: info.has_next(),
            previous_number: info.previous_number(),
            next_number: info.next_number(),
            show: info.num_pages > 1,
        }
    }
}

/// One page of posts with its paginator.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub posts: Vec<PostCard>,
    pub pagination: PaginationView,
    pub is_empty: bool,
    pub empty_message: String,
}

impl FeedView {
    pub fn new(page: &Page<Post>, base_path: &str, empty_message: &str) -> Self {
        Self {
            posts: page.items.iter().map(PostCard::from).collect(),
            pagination: PaginationView::new(&page.info, base_path),
            is_empty: page.is_empty(),
            empty_message: empty_message.to_string(),
        }
    }

    /// Renders the shared feed fragment embedded by every feed page.
    pub fn into_html(self) -> Result<String, AppError> {
        Ok(FeedPartial { feed: self }.render()?)
    }
}

/// The global feed; its body is the cached fragment.
pub struct IndexView {
    pub feed_html: String,
}

pub struct GroupView {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub feed_html: String,
}

impl GroupView {
    pub fn new(feed: &GroupFeed) -> Result<Self, AppError> {
        let base_path = format!("/group/{}", feed.group.slug);
        Ok(Self {
            title: feed.group.title.clone(),
            slug: feed.group.slug.clone(),
            description: feed.group.description.clone(),
            feed_html: FeedView::new(&feed.page, &base_path, "No posts in this group yet.")
                .into_html()?,
        })
    }
}

pub struct ProfileView {
    pub username: String,
    pub post_count: i64,
    pub follower_count: i64,
    pub following: bool,
    /// Follow buttons are shown to logged-in viewers other than the author.
    pub can_follow: bool,
    pub feed_html: String,
}

impl ProfileView {
    pub fn new(feed: &AuthorFeed, viewer: &Viewer) -> Result<Self, AppError> {
        let base_path = format!("/profile/{}", feed.author.username);
        let can_follow = viewer.user().is_some_and(|v| v.id != feed.author.id);
        Ok(Self {
            username: feed.author.username.clone(),
            post_count: feed.post_count,
            follower_count: feed.follower_count,
            following: feed.following,
            can_follow,
            feed_html: FeedView::new(&feed.page, &base_path, "No posts yet.").into_html()?,
        })
    }
}

pub struct FollowView {
    pub authors: Vec<String>,
    pub feed_html: String,
}

pub struct CommentView {
    pub author_username: String,
    pub text: String,
    pub published: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            author_username: comment.author_username.clone(),
            text: comment.text.clone(),
            published: comment.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

pub struct PostDetailView {
    pub post: PostCard,
    pub author_post_count: i64,
    pub comments: Vec<CommentView>,
    pub can_edit: bool,
    pub can_comment: bool,
}

impl PostDetailView {
    pub fn new(detail: &PostDetail, viewer: &Viewer) -> Self {
        let viewer_id = viewer.user().map(|u| u.id);
        Self {
            post: PostCard::from(&detail.post),
            author_post_count: detail.author_post_count,
            comments: detail.comments.iter().map(CommentView::from).collect(),
            can_edit: viewer_id == Some(detail.post.author_id),
            can_comment: viewer_id.is_some(),
        }
    }
}

/// Current values of the post form fields.
#[derive(Debug, Clone, Default)]
pub struct PostFormValues {
    pub text: String,
    pub group_id: Option<i64>,
}

pub struct GroupOption {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

pub struct PostFormView {
    pub form: PostFormValues,
    pub groups: Vec<GroupOption>,
    pub is_edit: bool,
    pub action: String,
    pub errors: Vec<String>,
    pub has_current_image: bool,
    pub current_image_url: String,
}

impl PostFormView {
    pub fn create(groups: &[Group], form: PostFormValues, errors: Vec<String>) -> Self {
        Self::build(groups, form, errors, false, "/create".to_string(), None)
    }

    pub fn edit(post: &Post, groups: &[Group], form: PostFormValues, errors: Vec<String>) -> Self {
        Self::build(
            groups,
            form,
            errors,
            true,
            format!("/posts/{}/edit", post.id),
            post.image.as_deref(),
        )
    }

    fn build(
        groups: &[Group],
        form: PostFormValues,
        errors: Vec<String>,
        is_edit: bool,
        action: String,
        image: Option<&str>,
    ) -> Self {
        let groups = groups
            .iter()
            .map(|g| GroupOption {
                id: g.id,
                title: g.to_string(),
                selected: form.group_id == Some(g.id),
            })
            .collect();

        Self {
            form,
            groups,
            is_edit,
            action,
            errors,
            has_current_image: image.is_some(),
            current_image_url: image.map(|p| format!("/media/{}", p)).unwrap_or_default(),
        }
    }
}

pub struct AuthFormView {
    pub username: String,
    pub next: String,
    pub error: String,
    pub has_error: bool,
}

impl AuthFormView {
    pub fn new(username: &str, next: Option<&str>, error: Option<String>) -> Self {
        Self {
            username: username.to_string(),
            next: next.unwrap_or_default().to_string(),
            has_error: error.is_some(),
            error: error.unwrap_or_default(),
        }
    }
}

// ── Templates ───────────────────────────────────────────────────────────────

/// The cacheable body of the global feed.
#[derive(Template)]
#[template(path = "partials/feed.html")]
pub struct FeedPartial {
    pub feed: FeedView,
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: Layout<IndexView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "group.html")]
pub struct GroupTemplate {
    pub view: Layout<GroupView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub view: Layout<ProfileView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "follow.html")]
pub struct FollowTemplate {
    pub view: Layout<FollowView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub view: Layout<PostDetailView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub view: Layout<PostFormView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub view: Layout<AuthFormView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub view: Layout<AuthFormView>,
}
