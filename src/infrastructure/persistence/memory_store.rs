//! In-process implementation of every repository trait.
//!
//! All tables sit behind one lock, so each call observes a consistent
//! snapshot. Used when no database is configured and by the HTTP tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{
    Comment, Follow, Group, GroupRef, NewComment, NewGroup, NewPost, NewUser, Post, PostPatch,
    User,
};
use crate::domain::repositories::{
    CommentRepository, FeedFilter, FollowRepository, GroupRepository, PostRepository,
    SessionRepository, UserRepository,
};
use crate::error::AppError;

struct StoredUser {
    user: User,
    password_hash: String,
}

struct StoredPost {
    id: i64,
    text: String,
    author_id: i64,
    group_id: Option<i64>,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

struct StoredComment {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created_at: DateTime<Utc>,
}

struct StoredSession {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<StoredUser>,
    groups: Vec<Group>,
    posts: Vec<StoredPost>,
    comments: Vec<StoredComment>,
    follows: Vec<Follow>,
    sessions: HashMap<String, StoredSession>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().map(|u| &u.user).find(|u| u.id == id)
    }

    fn require_user(&self, id: i64) -> Result<&User, AppError> {
        self.user(id)
            .ok_or_else(|| AppError::bad_request("Unknown user", json!({ "user_id": id })))
    }

    fn require_group(&self, id: Option<i64>) -> Result<(), AppError> {
        match id {
            Some(id) if !self.groups.iter().any(|g| g.id == id) => Err(AppError::bad_request(
                "Unknown group",
                json!({ "group_id": id }),
            )),
            _ => Ok(()),
        }
    }

    /// Joins a stored post with its author and group.
    fn materialize(&self, post: &StoredPost) -> Post {
        let author_username = self
            .user(post.author_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id))
            .map(GroupRef::from);

        Post::new(
            post.id,
            post.text.clone(),
            post.author_id,
            author_username,
            group,
            post.image.clone(),
            post.created_at,
        )
    }

    fn comment(&self, c: &StoredComment) -> Comment {
        Comment {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            author_username: self
                .user(c.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            text: c.text.clone(),
            created_at: c.created_at,
        }
    }

    /// Posts matching `filter`, newest first.
    fn feed(&self, filter: &FeedFilter) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .map(|p| self.materialize(p))
            .filter(|p| filter.matches(p))
            .collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        posts
    }
}

/// Repository backend holding every table in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a post with an explicit timestamp. Lets tests and seed data
    /// control feed order.
    pub async fn insert_post_at(
        &self,
        new_post: NewPost,
        created_at: DateTime<Utc>,
    ) -> Result<Post, AppError> {
        let mut tables = self.tables.write().await;
        tables.require_user(new_post.author_id)?;
        tables.require_group(new_post.group_id)?;

        let id = tables.next_id();
        let stored = StoredPost {
            id,
            text: new_post.text,
            author_id: new_post.author_id,
            group_id: new_post.group_id,
            image: new_post.image,
            created_at,
        };
        let post = tables.materialize(&stored);
        tables.posts.push(stored);
        Ok(post)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.user.username == new_user.username)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "users_username_key" }),
            ));
        }

        let user = User::new(tables.next_id(), new_user.username, Utc::now());
        tables.users.push(StoredUser {
            user: user.clone(),
            password_hash: new_user.password_hash,
        });
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.user(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.user.username == username)
            .map(|u| u.user.clone()))
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.user.username == username)
            .map(|u| (u.user.clone(), u.password_hash.clone())))
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.iter().map(|u| u.user.clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, new_group: NewGroup) -> Result<Group, AppError> {
        let mut tables = self.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == new_group.slug) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "groups_slug_key" }),
            ));
        }

        let group = Group::new(
            tables.next_id(),
            new_group.title,
            new_group.slug,
            new_group.description,
        );
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, AppError> {
        let tables = self.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, new_post: NewPost) -> Result<Post, AppError> {
        self.insert_post_at(new_post, Utc::now()).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.materialize(p)))
    }

    async fn update(&self, id: i64, patch: PostPatch) -> Result<Post, AppError> {
        let mut tables = self.tables.write().await;
        tables.require_group(patch.group_id)?;

        let stored = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found("Post not found", json!({ "id": id })))?;
        stored.text = patch.text;
        stored.group_id = patch.group_id;
        if let Some(image) = patch.image {
            stored.image = Some(image);
        }

        let tables = &*tables;
        let stored = tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found("Post not found", json!({ "id": id })))?;
        Ok(tables.materialize(stored))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        let removed = tables.posts.len() < before;
        if removed {
            tables.comments.retain(|c| c.post_id != id);
        }
        Ok(removed)
    }

    async fn list(
        &self,
        filter: FeedFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .feed(&filter)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: FeedFilter) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.feed(&filter).len() as i64)
    }

    async fn list_page(
        &self,
        filter: FeedFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Post>, i64), AppError> {
        let tables = self.tables.read().await;
        let feed = tables.feed(&filter);
        let total = feed.len() as i64;
        let items = feed
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((items, total))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, AppError> {
        let mut tables = self.tables.write().await;
        tables.require_user(new_comment.author_id)?;
        if !tables.posts.iter().any(|p| p.id == new_comment.post_id) {
            return Err(AppError::not_found(
                "Post not found",
                json!({ "id": new_comment.post_id }),
            ));
        }

        let stored = StoredComment {
            id: tables.next_id(),
            post_id: new_comment.post_id,
            author_id: new_comment.author_id,
            text: new_comment.text,
            created_at: Utc::now(),
        };
        let comment = tables.comment(&stored);
        tables.comments.push(stored);
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| tables.comment(c))
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn create(&self, user_id: i64, author_id: i64) -> Result<Follow, AppError> {
        let mut tables = self.tables.write().await;
        if user_id == author_id {
            return Err(AppError::bad_request(
                "Check constraint violation",
                json!({ "constraint": "follows_no_self" }),
            ));
        }
        tables.require_user(user_id)?;
        tables.require_user(author_id)?;
        if tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "follows_unique_pair" }),
            ));
        }

        let follow = Follow {
            id: tables.next_id(),
            user_id,
            author_id,
            created_at: Utc::now(),
        };
        tables.follows.push(follow.clone());
        Ok(follow)
    }

    async fn delete(&self, user_id: i64, author_id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() < before)
    }

    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn followed_authors(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        let mut authors: Vec<User> = tables
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter_map(|f| tables.user(f.author_id).cloned())
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(authors)
    }

    async fn count_followers(&self, author_id: i64) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.author_id == author_id)
            .count() as i64)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().await.follows.len() as i64)
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(
        &self,
        token_hash: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;
        tables.sessions.insert(
            token_hash.to_string(),
            StoredSession {
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn find_user(&self, token_hash: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .get(token_hash)
            .filter(|s| s.expires_at > Utc::now())
            .and_then(|s| tables.user(s.user_id).cloned()))
    }

    async fn delete(&self, token_hash: &str) -> Result<(), AppError> {
        self.tables.write().await.sessions.remove(token_hash);
        Ok(())
    }
}
