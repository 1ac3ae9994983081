//! Follow graph operations.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{Follow, User};
use crate::domain::repositories::{FollowRepository, UserRepository};
use crate::error::AppError;

/// Maintains directed follower → author edges.
///
/// Each (follower, author) pair is either following or not. Following twice
/// reports [`AppError::Conflict`] and unfollowing an absent edge does nothing,
/// so callers can treat both transitions as idempotent.
pub struct FollowService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    /// Makes `follower` follow the user named `author_username`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the author does not exist
    /// - [`AppError::Validation`] if a user tries to follow themselves
    /// - [`AppError::Conflict`] if the edge already exists
    pub async fn follow(&self, follower: &User, author_username: &str) -> Result<Follow, AppError> {
        let author = self.find_author(author_username).await?;

        if author.id == follower.id {
            return Err(AppError::bad_request(
                "You cannot follow yourself",
                json!({ "username": author_username }),
            ));
        }

        let follow = self.follows.create(follower.id, author.id).await?;
        tracing::info!(follower = %follower, author = %author, "Follow created");
        Ok(follow)
    }

    /// Removes the edge if present.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the author does not exist.
    pub async fn unfollow(&self, follower: &User, author_username: &str) -> Result<(), AppError> {
        let author = self.find_author(author_username).await?;

        if self.follows.delete(follower.id, author.id).await? {
            tracing::info!(follower = %follower, author = %author, "Follow removed");
        }
        Ok(())
    }

    pub async fn is_following(&self, follower_id: i64, author_id: i64) -> Result<bool, AppError> {
        self.follows.exists(follower_id, author_id).await
    }

    /// Authors `follower_id` follows, ordered by username.
    pub async fn followed_authors(&self, follower_id: i64) -> Result<Vec<User>, AppError> {
        self.follows.followed_authors(follower_id).await
    }

    /// Number of follow edges in the graph.
    pub async fn edge_count(&self) -> Result<i64, AppError> {
        self.follows.count().await
    }

    async fn find_author(&self, username: &str) -> Result<User, AppError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "username": username })))
    }
}
