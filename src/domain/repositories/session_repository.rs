//! Repository trait for login sessions.

use crate::domain::entities::User;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for browser sessions.
///
/// Only HMAC hashes of session tokens are stored, so a read-only view of the
/// store cannot be used to hijack a session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a new session.
    async fn create(
        &self,
        token_hash: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Returns the session's user if the session exists and has not expired.
    async fn find_user(&self, token_hash: &str) -> Result<Option<User>, AppError>;

    /// Removes a session. Unknown tokens are ignored.
    async fn delete(&self, token_hash: &str) -> Result<(), AppError>;
}
