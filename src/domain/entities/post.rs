//! Post entity representing a single publication.

use chrono::{DateTime, Utc};
use std::fmt;

use super::group::GroupRef;

/// Number of characters of text used as a post's short display form.
pub const POST_PREVIEW_CHARS: usize = 15;

/// A published post, joined with its author's name and its group.
///
/// `author_username` and `group` are denormalised from joins so listings can be
/// rendered without extra lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub author_username: String,
    pub group: Option<GroupRef>,
    /// Media store path of the attached image, if any.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Creates a new Post instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        text: String,
        author_id: i64,
        author_username: String,
        group: Option<GroupRef>,
        image: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text,
            author_id,
            author_username,
            group,
            image,
            created_at,
        }
    }

    /// Returns true if `user_id` wrote this post.
    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }

    /// Returns the id of the post's group, if it has one.
    pub fn group_id(&self) -> Option<i64> {
        self.group.as_ref().map(|g| g.id)
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(POST_PREVIEW_CHARS).collect();
        f.write_str(&preview)
    }
}

/// Input data for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Update applied when an author edits a post.
///
/// Text and group are always replaced. `image: None` keeps the current image.
#[derive(Debug, Clone)]
pub struct PostPatch {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_post(text: &str) -> Post {
        Post::new(
            1,
            text.to_string(),
            10,
            "auth".to_string(),
            None,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_post_display_truncates_to_preview() {
        let post = make_post("A test post with many more characters");
        assert_eq!(post.to_string(), "A test post wit");
        assert_eq!(post.to_string().chars().count(), POST_PREVIEW_CHARS);
    }

    #[test]
    fn test_post_display_counts_characters_not_bytes() {
        let post = make_post("Тестовый пост, тут больше символов");
        assert_eq!(post.to_string(), "Тестовый пост, ");
    }

    #[test]
    fn test_post_display_short_text() {
        let post = make_post("Short");
        assert_eq!(post.to_string(), "Short");
    }

    #[test]
    fn test_is_authored_by() {
        let post = make_post("text");
        assert!(post.is_authored_by(10));
        assert!(!post.is_authored_by(11));
    }

    #[test]
    fn test_group_id() {
        let mut post = make_post("text");
        assert_eq!(post.group_id(), None);

        post.group = Some(GroupRef {
            id: 3,
            slug: "s".to_string(),
            title: "S".to_string(),
        });
        assert_eq!(post.group_id(), Some(3));
    }
}
