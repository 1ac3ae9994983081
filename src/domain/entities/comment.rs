//! Comment entity.

use chrono::{DateTime, Utc};

/// A comment left on a post. Comments are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Input data for creating a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}
