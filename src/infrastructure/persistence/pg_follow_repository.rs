//! PostgreSQL implementation of follow repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{FollowRow, UserRow};
use crate::domain::entities::{Follow, User};
use crate::domain::repositories::FollowRepository;
use crate::error::AppError;

/// PostgreSQL repository for follow edges.
///
/// Pair uniqueness and the no-self-follow rule are enforced by table
/// constraints; violations surface as `Conflict` and `Validation`.
pub struct PgFollowRepository {
    pool: Arc<PgPool>,
}

impl PgFollowRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn create(&self, user_id: i64, author_id: i64) -> Result<Follow, AppError> {
        let row = sqlx::query_as::<_, FollowRow>(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            RETURNING id, user_id, author_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, user_id: i64, author_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn followed_authors(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.username, u.created_at
            FROM follows f
            JOIN users u ON u.id = f.author_id
            WHERE f.user_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn count_followers(&self, author_id: i64) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
