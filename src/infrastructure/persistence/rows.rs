//! Row types shared by the PostgreSQL repositories.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entities::{Comment, Follow, Group, GroupRef, Post, User};

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User::new(r.id, r.username, r.created_at)
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CredentialsRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub(crate) struct GroupRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<GroupRow> for Group {
    fn from(r: GroupRow) -> Self {
        Group::new(r.id, r.title, r.slug, r.description)
    }
}

/// A post joined with its author and optional group.
#[derive(Debug, FromRow)]
pub(crate) struct PostRow {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        let group = match (r.group_id, r.group_slug, r.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(GroupRef { id, slug, title }),
            _ => None,
        };
        Post::new(
            r.id,
            r.text,
            r.author_id,
            r.author_username,
            group,
            r.image,
            r.created_at,
        )
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Self {
        Comment {
            id: r.id,
            post_id: r.post_id,
            author_id: r.author_id,
            author_username: r.author_username,
            text: r.text,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct FollowRow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FollowRow> for Follow {
    fn from(r: FollowRow) -> Self {
        Follow {
            id: r.id,
            user_id: r.user_id,
            author_id: r.author_id,
            created_at: r.created_at,
        }
    }
}
