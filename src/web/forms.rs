//! Form and query payloads accepted by the site.

use axum::extract::Multipart;
use serde::Deserialize;
use serde_json::json;
use serde_with::{DefaultOnError, DisplayFromStr, serde_as};
use validator::Validate;

use crate::application::pagination::PageRequest;
use crate::application::services::PostInput;
use crate::error::AppError;
use crate::infrastructure::media::Upload;

/// `?page=N`. Missing, zero or unparsable values fall back to page one.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page)
    }
}

/// `?next=/path` carried through the login and signup pages.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, message = "Username is required"))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(default)]
    pub password1: String,
    #[validate(must_match(other = "password1", message = "The two password fields didn't match"))]
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

/// Reads the multipart post form (`text`, `group`, `image`).
///
/// An empty `group` means no group. A file part without a name or without
/// content counts as no upload, which is what browsers send when the file
/// input is left blank.
pub async fn read_post_form(mut multipart: Multipart) -> Result<PostInput, AppError> {
    let mut input = PostInput::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::bad_request("Malformed form data", json!({ "reason": e.body_text() }))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => input.text = field_text(field).await?,
            "group" => {
                let raw = field_text(field).await?;
                let raw = raw.trim();
                input.group_id = if raw.is_empty() {
                    None
                } else {
                    Some(raw.parse::<i64>().map_err(|_| {
                        AppError::bad_request("Select a valid group", json!({ "field": "group" }))
                    })?)
                };
            }
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::bad_request("Failed to read upload", json!({ "reason": e.body_text() }))
                })?;

                if !file_name.is_empty() && !bytes.is_empty() {
                    input.image = Some(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(input)
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::bad_request("Malformed form data", json!({ "reason": e.body_text() })))
}
