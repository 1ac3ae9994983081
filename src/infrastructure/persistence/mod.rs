//! Entity Store implementations.
//!
//! Concrete implementations of the domain repository traits: one SQLx-backed
//! PostgreSQL repository per trait, and [`MemoryStore`], which implements all
//! of them in process.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - User accounts and credentials
//! - [`PgGroupRepository`] - Post groups
//! - [`PgPostRepository`] - Posts and feed queries
//! - [`PgCommentRepository`] - Comments
//! - [`PgFollowRepository`] - Follow edges
//! - [`PgSessionRepository`] - Login sessions

pub mod memory_store;
pub mod pg_comment_repository;
pub mod pg_follow_repository;
pub mod pg_group_repository;
pub mod pg_post_repository;
pub mod pg_session_repository;
pub mod pg_user_repository;
mod rows;

pub use memory_store::MemoryStore;
pub use pg_comment_repository::PgCommentRepository;
pub use pg_follow_repository::PgFollowRepository;
pub use pg_group_repository::PgGroupRepository;
pub use pg_post_repository::PgPostRepository;
pub use pg_session_repository::PgSessionRepository;
pub use pg_user_repository::PgUserRepository;

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, SessionRepository,
    UserRepository,
};

/// One handle per repository trait, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Repositories {
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            groups: Arc::new(PgGroupRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            follows: Arc::new(PgFollowRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool)),
        }
    }

    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store.clone(),
            sessions: store,
        }
    }
}
