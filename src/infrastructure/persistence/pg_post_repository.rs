//! PostgreSQL implementation of post repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::{Executor, PgPool, Postgres};
use std::sync::Arc;

use super::rows::PostRow;
use crate::domain::entities::{NewPost, Post, PostPatch};
use crate::domain::repositories::{FeedFilter, PostRepository};
use crate::error::AppError;

/// Columns every post query returns, given a post relation aliased `p`.
const POST_COLUMNS: &str = r#"
    p.id, p.text, p.author_id, u.username AS author_username,
    g.id AS group_id, g.slug AS group_slug, g.title AS group_title,
    p.image, p.created_at
"#;

/// Feed filter; `$1` group, `$2` author, `$3` author set.
const FEED_WHERE: &str = r#"
    WHERE ($1::bigint IS NULL OR p.group_id = $1)
      AND ($2::bigint IS NULL OR p.author_id = $2)
      AND ($3::bigint[] IS NULL OR p.author_id = ANY($3))
"#;

/// PostgreSQL repository for posts and feed queries.
pub struct PgPostRepository {
    pool: Arc<PgPool>,
}

impl PgPostRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, AppError> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (text, author_id, group_id, image)
                VALUES ($1, $2, $3, $4)
                RETURNING id, text, author_id, group_id, image, created_at
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&new_post.text)
            .bind(new_post.author_id)
            .bind(new_post.group_id)
            .bind(&new_post.image)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            WHERE p.id = $1
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Post::from))
    }

    async fn update(&self, id: i64, patch: PostPatch) -> Result<Post, AppError> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts SET
                    text     = $2,
                    group_id = $3,
                    image    = COALESCE($4, image)
                WHERE id = $1
                RETURNING id, text, author_id, group_id, image, created_at
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(&patch.text)
            .bind(patch.group_id)
            .bind(&patch.image)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Post::from)
            .ok_or_else(|| AppError::not_found("Post not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        filter: FeedFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>, AppError> {
        fetch_window(self.pool.as_ref(), &filter, offset, limit).await
    }

    async fn count(&self, filter: FeedFilter) -> Result<i64, AppError> {
        fetch_count(self.pool.as_ref(), &filter).await
    }

    async fn list_page(
        &self,
        filter: FeedFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Post>, i64), AppError> {
        // Both reads run in one REPEATABLE READ transaction, so they share a snapshot.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let total = fetch_count(&mut *tx, &filter).await?;
        let items = fetch_window(&mut *tx, &filter, offset, limit).await?;
        tx.commit().await?;

        Ok((items, total))
    }
}

async fn fetch_window<'e, E>(
    executor: E,
    filter: &FeedFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<Post>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN groups g ON g.id = p.group_id
        {FEED_WHERE}
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $4 OFFSET $5
        "#
    );

    let rows = sqlx::query_as::<_, PostRow>(&sql)
        .bind(filter.group_id)
        .bind(filter.author_id)
        .bind(filter.author_ids.clone())
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(Post::from).collect())
}

async fn fetch_count<'e, E>(executor: E, filter: &FeedFilter) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT COUNT(*) FROM posts p {FEED_WHERE}");

    let count = sqlx::query_scalar::<_, i64>(&sql)
        .bind(filter.group_id)
        .bind(filter.author_id)
        .bind(filter.author_ids.clone())
        .fetch_one(executor)
        .await?;

    Ok(count)
}
