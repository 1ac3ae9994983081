//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for users.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username is taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Finds a user by database ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Finds a user by their unique username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Finds a user together with their stored password hash.
    ///
    /// Only the auth service should call this.
    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>, AppError>;

    /// Lists all users ordered by username.
    async fn list(&self) -> Result<Vec<User>, AppError>;
}
