//! PostgreSQL implementation of comment repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::CommentRow;
use crate::domain::entities::{Comment, NewComment};
use crate::domain::repositories::CommentRepository;
use crate::error::AppError;

/// PostgreSQL repository for comments.
pub struct PgCommentRepository {
    pool: Arc<PgPool>,
}

impl PgCommentRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH c AS (
                INSERT INTO comments (post_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, author_id, text, created_at
            )
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created_at
            FROM c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(new_comment.post_id)
        .bind(new_comment.author_id)
        .bind(&new_comment.text)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at, c.id
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}
