//! Comments on posts.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{Comment, NewComment, User};
use crate::domain::repositories::{CommentRepository, PostRepository};
use crate::error::AppError;

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Appends a comment by `author` to a post.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the post does not exist
    /// - [`AppError::Validation`] if the text is blank
    pub async fn add_comment(
        &self,
        author: &User,
        post_id: i64,
        text: &str,
    ) -> Result<Comment, AppError> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(AppError::not_found("Post not found", json!({ "id": post_id })));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::bad_request(
                "Comment text is required",
                json!({ "field": "text" }),
            ));
        }

        let comment = self
            .comments
            .create(NewComment {
                post_id,
                author_id: author.id,
                text: text.to_string(),
            })
            .await?;

        tracing::debug!(post_id, comment_id = comment.id, "Comment added");
        Ok(comment)
    }
}
