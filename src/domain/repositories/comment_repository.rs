//! Repository trait for comments.

use crate::domain::entities::{Comment, NewComment};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Creates a comment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_comment: NewComment) -> Result<Comment, AppError>;

    /// Lists a post's comments, oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError>;
}
