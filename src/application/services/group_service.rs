//! Group management, used by the admin CLI.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::json;

use crate::domain::entities::{Group, NewGroup};
use crate::domain::repositories::GroupRepository;
use crate::error::AppError;

static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));

pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }

    /// Creates a group.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a blank title or a malformed slug
    /// - [`AppError::Conflict`] if the slug is taken
    pub async fn create_group(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<Group, AppError> {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > 200 {
            return Err(AppError::bad_request(
                "Group title must be 1-200 characters",
                json!({ "field": "title" }),
            ));
        }
        if !SLUG_REGEX.is_match(slug) {
            return Err(AppError::bad_request(
                "Slug may only contain letters, digits, hyphens and underscores",
                json!({ "field": "slug", "slug": slug }),
            ));
        }

        self.groups
            .create(NewGroup {
                title: title.to_string(),
                slug: slug.to_string(),
                description: description.trim().to_string(),
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => {
                    AppError::conflict("Slug already in use", json!({ "slug": slug }))
                }
                other => other,
            })
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, AppError> {
        self.groups.list().await
    }
}
