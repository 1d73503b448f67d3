use serde::{Deserialize, Serialize};

use super::repo_types::BlogChanges;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
    pub image: Option<String>,
}

/// Partial update. Anything outside these four fields is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

/// `{message, data}` envelope used by every blog endpoint that returns data.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub message: &'static str,
    pub data: T,
}

fn required(field: &str, value: String) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional_image(image: Option<String>) -> Option<String> {
    image.filter(|s| !s.trim().is_empty())
}

/// Validated fields of a new blog.
#[derive(Debug)]
pub struct BlogDraft {
    pub title: String,
    pub category: String,
    pub content: String,
    pub image: Option<String>,
}

impl CreateBlogRequest {
    pub fn validate(self) -> Result<BlogDraft, ApiError> {
        Ok(BlogDraft {
            title: required("Title", self.title)?,
            category: required("Category", self.category)?,
            content: required("Content", self.content)?,
            image: optional_image(self.image),
        })
    }
}

impl UpdateBlogRequest {
    /// Supplied text fields must be non-blank; a blank image is ignored.
    pub fn into_changes(self) -> Result<BlogChanges, ApiError> {
        let changes = BlogChanges {
            title: self.title.map(|v| required("Title", v)).transpose()?,
            category: self.category.map(|v| required("Category", v)).transpose()?,
            content: self.content.map(|v| required("Content", v)).transpose()?,
            image: optional_image(self.image),
        };
        if changes.is_empty() {
            return Err(ApiError::Validation("No fields to update".into()));
        }
        Ok(changes)
    }
}
