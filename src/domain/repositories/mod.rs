//! Repository trait definitions for the domain layer.
//!
//! These traits are the Entity Store contract. Concrete implementations live in
//! `crate::infrastructure::persistence`: one PostgreSQL repository per trait,
//! plus [`crate::infrastructure::persistence::MemoryStore`], which implements
//! all of them over a single in-process snapshot.
//!
//! # Available Repositories
//!
//! - [`UserRepository`] - User accounts and credentials
//! - [`GroupRepository`] - Post groups
//! - [`PostRepository`] - Posts and feed queries
//! - [`CommentRepository`] - Comments on posts
//! - [`FollowRepository`] - Follow edges
//! - [`SessionRepository`] - Login sessions
//!
//! Mock implementations are generated via `mockall` for unit tests.

pub mod comment_repository;
pub mod follow_repository;
pub mod group_repository;
pub mod post_repository;
pub mod session_repository;
pub mod user_repository;

pub use comment_repository::CommentRepository;
pub use follow_repository::FollowRepository;
pub use group_repository::GroupRepository;
pub use post_repository::{FeedFilter, PostRepository};
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use comment_repository::MockCommentRepository;
#[cfg(test)]
pub use follow_repository::MockFollowRepository;
#[cfg(test)]
pub use group_repository::MockGroupRepository;
#[cfg(test)]
pub use post_repository::MockPostRepository;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
