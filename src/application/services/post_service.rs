//! Post creation and author-only editing.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{Group, NewPost, Post, PostPatch, User};
use crate::domain::repositories::{GroupRepository, PostRepository};
use crate::error::AppError;
use crate::infrastructure::media::{MediaStore, Upload};

/// Image extensions accepted for post attachments.
const IMAGE_EXTENSIONS: &[&str] = &["gif", "png", "jpg", "jpeg", "webp", "bmp"];

/// Submitted post fields, shared by the create and edit forms.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<Upload>,
}

/// Service for writing posts.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            posts,
            groups,
            media,
        }
    }

    /// Publishes a new post by `author`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for blank text, an unknown group or a
    /// non-image upload.
    pub async fn create_post(&self, author: &User, input: PostInput) -> Result<Post, AppError> {
        let text = self.validate(&input).await?;
        let image = self.store_image(input.image).await?;

        let post = self
            .posts
            .create(NewPost {
                text,
                author_id: author.id,
                group_id: input.group_id,
                image,
            })
            .await?;

        tracing::info!(post_id = post.id, author = %author, "Post created");
        Ok(post)
    }

    /// Loads a post for its author to edit.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the post does not exist
    /// - [`AppError::Forbidden`] if `editor` is not the author
    pub async fn post_for_edit(&self, editor: &User, post_id: i64) -> Result<Post, AppError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found", json!({ "id": post_id })))?;

        if !post.is_authored_by(editor.id) {
            return Err(AppError::forbidden(
                "Only the author can edit this post",
                json!({ "id": post_id, "user_id": editor.id }),
            ));
        }

        Ok(post)
    }

    /// Replaces text and group. The image changes only when a new one is
    /// uploaded.
    ///
    /// # Errors
    ///
    /// See [`Self::post_for_edit`] and [`Self::create_post`].
    pub async fn edit_post(
        &self,
        editor: &User,
        post_id: i64,
        input: PostInput,
    ) -> Result<Post, AppError> {
        let post = self.post_for_edit(editor, post_id).await?;
        let text = self.validate(&input).await?;
        let image = self.store_image(input.image).await?;

        let updated = self
            .posts
            .update(
                post.id,
                PostPatch {
                    text,
                    group_id: input.group_id,
                    image,
                },
            )
            .await?;

        tracing::info!(post_id = updated.id, "Post edited");
        Ok(updated)
    }

    /// Groups offered by the post form.
    pub async fn list_groups(&self) -> Result<Vec<Group>, AppError> {
        self.groups.list().await
    }

    /// Returns the trimmed text once every field checks out.
    async fn validate(&self, input: &PostInput) -> Result<String, AppError> {
        let text = input.text.trim();
        if text.is_empty() {
            return Err(AppError::bad_request(
                "Post text is required",
                json!({ "field": "text" }),
            ));
        }

        if let Some(group_id) = input.group_id
            && self.groups.find_by_id(group_id).await?.is_none()
        {
            return Err(AppError::bad_request(
                "Select a valid group",
                json!({ "field": "group", "group_id": group_id }),
            ));
        }

        if let Some(upload) = &input.image {
            let is_image = upload
                .extension()
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
            if !is_image || upload.bytes.is_empty() {
                return Err(AppError::bad_request(
                    "Upload a valid image",
                    json!({ "field": "image", "file_name": upload.file_name }),
                ));
            }
        }

        Ok(text.to_string())
    }

    async fn store_image(&self, upload: Option<Upload>) -> Result<Option<String>, AppError> {
        match upload {
            Some(upload) => Ok(Some(self.media.save(upload).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockGroupRepository, MockPostRepository};
    use crate::infrastructure::media::MemoryMediaStore;
    use chrono::Utc;

    fn author() -> User {
        User::new(1, "leo".to_string(), Utc::now())
    }

    fn stored_post(author_id: i64) -> Post {
        Post::new(
            5,
            "Original text".to_string(),
            author_id,
            "leo".to_string(),
            None,
            None,
            Utc::now(),
        )
    }

    fn gif() -> Upload {
        Upload {
            file_name: "small.gif".to_string(),
            content_type: Some("image/gif".to_string()),
            bytes: b"GIF89a\x01\x00\x01\x00".to_vec(),
        }
    }

    fn service(posts: MockPostRepository, groups: MockGroupRepository) -> PostService {
        PostService::new(
            Arc::new(posts),
            Arc::new(groups),
            Arc::new(MemoryMediaStore::new()),
        )
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let mut posts = MockPostRepository::new();
        posts.expect_create().never();

        let err = service(posts, MockGroupRepository::new())
            .create_post(
                &author(),
                PostInput {
                    text: "   ".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_group_is_rejected() {
        let mut groups = MockGroupRepository::new();
        groups.expect_find_by_id().returning(|_| Ok(None));

        let err = service(MockPostRepository::new(), groups)
            .create_post(
                &author(),
                PostInput {
                    text: "Hello".to_string(),
                    group_id: Some(99),
                    image: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_non_image_upload_is_rejected() {
        let err = service(MockPostRepository::new(), MockGroupRepository::new())
            .create_post(
                &author(),
                PostInput {
                    text: "Hello".to_string(),
                    group_id: None,
                    image: Some(Upload {
                        file_name: "notes.txt".to_string(),
                        content_type: Some("text/plain".to_string()),
                        bytes: b"hi".to_vec(),
                    }),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_stores_image_path() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_create()
            .withf(|p| {
                p.text == "Hello"
                    && p.image
                        .as_deref()
                        .is_some_and(|path| path.starts_with("posts/") && path.ends_with(".gif"))
            })
            .times(1)
            .returning(|p| {
                Ok(Post::new(
                    1,
                    p.text,
                    p.author_id,
                    "leo".to_string(),
                    None,
                    p.image,
                    Utc::now(),
                ))
            });

        let post = service(posts, MockGroupRepository::new())
            .create_post(
                &author(),
                PostInput {
                    text: "  Hello ".to_string(),
                    group_id: None,
                    image: Some(gif()),
                },
            )
            .await
            .unwrap();

        assert!(post.image.is_some());
    }

    #[tokio::test]
    async fn test_non_author_cannot_edit() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .returning(|_| Ok(Some(stored_post(2))));
        posts.expect_update().never();

        let err = service(posts, MockGroupRepository::new())
            .edit_post(
                &author(),
                5,
                PostInput {
                    text: "Hijacked".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_edit_without_upload_keeps_image() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .returning(|_| Ok(Some(stored_post(1))));
        posts
            .expect_update()
            .withf(|id, patch| *id == 5 && patch.image.is_none() && patch.text == "Edited")
            .times(1)
            .returning(|_, patch| {
                Ok(Post::new(
                    5,
                    patch.text,
                    1,
                    "leo".to_string(),
                    None,
                    Some("posts/old.gif".to_string()),
                    Utc::now(),
                ))
            });

        let post = service(posts, MockGroupRepository::new())
            .edit_post(
                &author(),
                5,
                PostInput {
                    text: "Edited".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(post.image.as_deref(), Some("posts/old.gif"));
    }
}
