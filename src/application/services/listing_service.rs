//! Feed listings and the post-detail read model.

use std::sync::Arc;

use serde_json::json;

use crate::application::pagination::{Page, PageRequest};
use crate::domain::entities::{Comment, Group, Post, User};
use crate::domain::repositories::{
    CommentRepository, FeedFilter, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};
use crate::error::AppError;

/// A page of a group's feed.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<Post>,
}

/// A page of an author's feed, with what the profile header shows.
#[derive(Debug, Clone)]
pub struct AuthorFeed {
    pub author: User,
    pub page: Page<Post>,
    pub post_count: i64,
    pub follower_count: i64,
    /// Whether the viewer follows this author. Always false for anonymous
    /// viewers and for the author's own profile.
    pub following: bool,
}

/// A post with its comments, oldest first.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub author_post_count: i64,
}

/// Produces paginated, newest-first feeds of posts.
///
/// Every feed is the global feed narrowed by a [`FeedFilter`]; pages hold
/// [`crate::application::pagination::PAGE_SIZE`] posts and a page past the
/// end is simply empty.
pub struct ListingService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl ListingService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            follows,
            comments,
        }
    }

    /// All posts.
    pub async fn global_feed(&self, page: PageRequest) -> Result<Page<Post>, AppError> {
        self.feed(FeedFilter::all(), page).await
    }

    /// Posts in the group with `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no group has that slug.
    pub async fn group_feed(&self, slug: &str, page: PageRequest) -> Result<GroupFeed, AppError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Group not found", json!({ "slug": slug })))?;

        let page = self
            .feed(FeedFilter::all().with_group(group.id), page)
            .await?;

        Ok(GroupFeed { group, page })
    }

    /// Posts written by `username`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn author_feed(
        &self,
        username: &str,
        viewer: Option<&User>,
        page: PageRequest,
    ) -> Result<AuthorFeed, AppError> {
        let author = self.find_author(username).await?;

        let page = self
            .feed(FeedFilter::all().with_author(author.id), page)
            .await?;
        let follower_count = self.follows.count_followers(author.id).await?;

        let following = match viewer {
            Some(viewer) if viewer.id != author.id => {
                self.follows.exists(viewer.id, author.id).await?
            }
            _ => false,
        };

        Ok(AuthorFeed {
            author,
            post_count: page.info.total,
            page,
            follower_count,
            following,
        })
    }

    /// Posts by the authors `viewer` follows. Empty when they follow nobody.
    pub async fn follow_feed(
        &self,
        viewer: &User,
        page: PageRequest,
    ) -> Result<Page<Post>, AppError> {
        let author_ids = self
            .follows
            .followed_authors(viewer.id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        self.feed(FeedFilter::all().with_authors(author_ids), page)
            .await
    }

    /// A post with its comments.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the post does not exist.
    pub async fn post_detail(&self, post_id: i64) -> Result<PostDetail, AppError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found", json!({ "id": post_id })))?;

        let comments = self.comments.list_for_post(post.id).await?;
        let author_post_count = self
            .posts
            .count(FeedFilter::all().with_author(post.author_id))
            .await?;

        Ok(PostDetail {
            post,
            comments,
            author_post_count,
        })
    }

    /// Total number of posts, used by health and stats reporting.
    pub async fn total_posts(&self) -> Result<i64, AppError> {
        self.posts.count(FeedFilter::all()).await
    }

    async fn find_author(&self, username: &str) -> Result<User, AppError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "username": username })))
    }

    async fn feed(&self, filter: FeedFilter, page: PageRequest) -> Result<Page<Post>, AppError> {
        let (items, total) = self
            .posts
            .list_page(filter, page.offset(), page.limit())
            .await?;

        Ok(Page::new(items, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        MockCommentRepository, MockFollowRepository, MockGroupRepository, MockPostRepository,
        MockUserRepository,
    };
    use chrono::Utc;

    fn user(id: i64, name: &str) -> User {
        User::new(id, name.to_string(), Utc::now())
    }

    fn post(id: i64, author: &User) -> Post {
        Post::new(
            id,
            format!("Post number {}", id),
            author.id,
            author.username.clone(),
            None,
            None,
            Utc::now(),
        )
    }

    struct Mocks {
        posts: MockPostRepository,
        groups: MockGroupRepository,
        users: MockUserRepository,
        follows: MockFollowRepository,
        comments: MockCommentRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                posts: MockPostRepository::new(),
                groups: MockGroupRepository::new(),
                users: MockUserRepository::new(),
                follows: MockFollowRepository::new(),
                comments: MockCommentRepository::new(),
            }
        }

        fn service(self) -> ListingService {
            ListingService::new(
                Arc::new(self.posts),
                Arc::new(self.groups),
                Arc::new(self.users),
                Arc::new(self.follows),
                Arc::new(self.comments),
            )
        }
    }

    #[tokio::test]
    async fn test_global_feed_uses_page_window() {
        let author = user(1, "leo");
        let mut mocks = Mocks::new();
        let listed = vec![post(3, &author), post(2, &author), post(1, &author)];
        mocks
            .posts
            .expect_list_page()
            .withf(|f, offset, limit| *f == FeedFilter::all() && *offset == 10 && *limit == 10)
            .times(1)
            .returning(move |_, _, _| Ok((listed.clone(), 13)));
        mocks.posts.expect_count().never();
        mocks.posts.expect_list().never();

        let page = mocks
            .service()
            .global_feed(PageRequest::new(Some(2)))
            .await
            .unwrap();

        assert_eq!(page.len(), 3);
        assert_eq!(page.info.num_pages, 2);
        assert_eq!(page.info.number, 2);
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.groups.expect_find_by_slug().returning(|_| Ok(None));

        let err = mocks
            .service()
            .group_feed("missing", PageRequest::first())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_group_feed_filters_by_group() {
        let mut mocks = Mocks::new();
        mocks.groups.expect_find_by_slug().returning(|slug| {
            Ok(Some(Group::new(
                7,
                "Cats".to_string(),
                slug.to_string(),
                String::new(),
            )))
        });
        mocks
            .posts
            .expect_list_page()
            .withf(|f, _, _| f.group_id == Some(7))
            .returning(|_, _, _| Ok((vec![], 0)));

        let feed = mocks
            .service()
            .group_feed("cats", PageRequest::first())
            .await
            .unwrap();

        assert_eq!(feed.group.id, 7);
        assert!(feed.page.is_empty());
    }

    #[tokio::test]
    async fn test_follow_feed_with_no_follows_is_empty() {
        let viewer = user(1, "viewer");
        let mut mocks = Mocks::new();
        mocks
            .follows
            .expect_followed_authors()
            .returning(|_| Ok(vec![]));
        mocks
            .posts
            .expect_list_page()
            .withf(|f, _, _| f.author_ids == Some(vec![]))
            .returning(|_, _, _| Ok((vec![], 0)));

        let page = mocks
            .service()
            .follow_feed(&viewer, PageRequest::first())
            .await
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.info.num_pages, 1);
    }

    #[tokio::test]
    async fn test_author_feed_reports_following_for_viewer() {
        let viewer = user(1, "viewer");
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_username()
            .returning(|name| Ok(Some(User::new(2, name.to_string(), Utc::now()))));
        mocks.posts.expect_list_page().returning(|_, _, _| Ok((vec![], 4)));
        mocks.follows.expect_count_followers().returning(|_| Ok(1));
        mocks
            .follows
            .expect_exists()
            .withf(|user_id, author_id| *user_id == 1 && *author_id == 2)
            .returning(|_, _| Ok(true));

        let feed = mocks
            .service()
            .author_feed("leo", Some(&viewer), PageRequest::first())
            .await
            .unwrap();

        assert!(feed.following);
        assert_eq!(feed.post_count, 4);
        assert_eq!(feed.follower_count, 1);
    }

    #[tokio::test]
    async fn test_own_profile_is_never_following() {
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_username()
            .returning(|name| Ok(Some(User::new(1, name.to_string(), Utc::now()))));
        mocks.posts.expect_list_page().returning(|_, _, _| Ok((vec![], 0)));
        mocks.follows.expect_count_followers().returning(|_| Ok(0));
        mocks.follows.expect_exists().never();

        let me = user(1, "leo");
        let feed = mocks
            .service()
            .author_feed("leo", Some(&me), PageRequest::first())
            .await
            .unwrap();

        assert!(!feed.following);
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.posts.expect_find_by_id().returning(|_| Ok(None));

        let err = mocks.service().post_detail(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
