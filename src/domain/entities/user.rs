//! User entity: an author, commenter and follower.

use chrono::{DateTime, Utc};
use std::fmt;

/// A registered user.
///
/// Users are created through sign-up or the admin CLI and are never modified
/// by the content core. The password hash is deliberately not part of this
/// struct; see [`crate::domain::repositories::UserRepository::find_credentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new User instance.
    pub fn new(id: i64, username: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            username,
            created_at,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// Input data for registering a user.
///
/// `password_hash` is an Argon2 PHC string produced by the auth service.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}
