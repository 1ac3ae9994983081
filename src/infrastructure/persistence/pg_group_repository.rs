//! PostgreSQL implementation of group repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::GroupRow;
use crate::domain::entities::{Group, NewGroup};
use crate::domain::repositories::GroupRepository;
use crate::error::AppError;

/// PostgreSQL repository for post groups.
pub struct PgGroupRepository {
    pool: Arc<PgPool>,
}

impl PgGroupRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn create(&self, new_group: NewGroup) -> Result<Group, AppError> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&new_group.title)
        .bind(&new_group.slug)
        .bind(&new_group.description)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, AppError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Group::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, AppError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Group::from))
    }

    async fn list(&self) -> Result<Vec<Group>, AppError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM groups ORDER BY title, id",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Group::from).collect())
    }
}
