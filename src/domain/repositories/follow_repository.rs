//! Repository trait for follow edges.

use crate::domain::entities::{Follow, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the follow graph.
///
/// The store enforces at most one edge per `(user_id, author_id)` pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Creates an edge `user_id -> author_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the edge already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, user_id: i64, author_id: i64) -> Result<Follow, AppError>;

    /// Removes the edge. Returns `Ok(false)` if there was none.
    async fn delete(&self, user_id: i64, author_id: i64) -> Result<bool, AppError>;

    /// Returns true if the edge exists.
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, AppError>;

    /// Lists the users `user_id` follows, ordered by username.
    async fn followed_authors(&self, user_id: i64) -> Result<Vec<User>, AppError>;

    /// Counts the users following `author_id`.
    async fn count_followers(&self, author_id: i64) -> Result<i64, AppError>;

    /// Counts all edges in the graph.
    async fn count(&self) -> Result<i64, AppError>;
}
