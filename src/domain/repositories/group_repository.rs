//! Repository trait for post groups.

use crate::domain::entities::{Group, NewGroup};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for groups.
///
/// Groups are created from the admin CLI and read by the listing and post
/// services.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Creates a new group.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug is taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_group: NewGroup) -> Result<Group, AppError>;

    /// Finds a group by database ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, AppError>;

    /// Finds a group by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, AppError>;

    /// Lists all groups ordered by title.
    async fn list(&self) -> Result<Vec<Group>, AppError>;
}
