//! Repository trait for posts and feed queries.

use crate::domain::entities::{NewPost, Post, PostPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Filter criteria narrowing the global feed.
///
/// All criteria are combined with AND. An empty `author_ids` list matches no
/// posts at all, which is what a viewer who follows nobody should see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilter {
    pub group_id: Option<i64>,
    pub author_id: Option<i64>,
    pub author_ids: Option<Vec<i64>>,
}

impl FeedFilter {
    /// The unfiltered global feed.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the feed to one group.
    pub fn with_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Restricts the feed to one author.
    pub fn with_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Restricts the feed to a set of authors.
    pub fn with_authors(mut self, author_ids: Vec<i64>) -> Self {
        self.author_ids = Some(author_ids);
        self
    }

    /// Returns true if a post passes every criterion.
    pub fn matches(&self, post: &Post) -> bool {
        self.group_id.is_none_or(|g| post.group_id() == Some(g))
            && self.author_id.is_none_or(|a| post.author_id == a)
            && self
                .author_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&post.author_id))
    }
}

/// Repository interface for posts.
///
/// Feed queries order newest-first by `created_at`, breaking ties by id
/// descending, so pagination is stable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Creates a new post.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_post: NewPost) -> Result<Post, AppError>;

    /// Finds a post by database ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// Applies an author edit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the post does not exist.
    async fn update(&self, id: i64, patch: PostPatch) -> Result<Post, AppError>;

    /// Deletes a post. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Lists one window of the feed described by `filter`.
    async fn list(&self, filter: FeedFilter, offset: i64, limit: i64)
    -> Result<Vec<Post>, AppError>;

    /// Counts the posts matching `filter`.
    async fn count(&self, filter: FeedFilter) -> Result<i64, AppError>;

    /// One window of the feed together with the total number of matching
    /// posts, both read from the same snapshot.
    async fn list_page(
        &self,
        filter: FeedFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Post>, i64), AppError>;
}
