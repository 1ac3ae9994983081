//! Follow entity: a directed subscription edge between two users.

use chrono::{DateTime, Utc};

/// `user_id` follows `author_id`.
///
/// At most one edge exists per pair, and a user never follows themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}
