use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Blog record in the database. `user_id` is the owner and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub content: String,
    pub image: Option<String>,
    pub author: String, // owner's name at creation time
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A blog together with its owner's current public details.
#[derive(Debug, Clone, Serialize)]
pub struct BlogListItem {
    #[serde(flatten)]
    pub blog: Blog,
    pub user: Option<BlogOwner>,
}

/// Row shape of the `blogs LEFT JOIN users` list query.
#[derive(Debug, FromRow)]
pub(crate) struct BlogListRow {
    #[sqlx(flatten)]
    pub blog: Blog,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

impl From<BlogListRow> for BlogListItem {
    fn from(r: BlogListRow) -> Self {
        let user = match (r.owner_name, r.owner_email) {
            (Some(name), Some(email)) => Some(BlogOwner {
                id: r.blog.user_id,
                name,
                email,
            }),
            _ => None,
        };
        Self { blog: r.blog, user }
    }
}

#[derive(Debug, Clone)]
pub struct NewBlog {
    pub user_id: Uuid,
    pub author: String,
    pub title: String,
    pub category: String,
    pub content: String,
    pub image: Option<String>,
}

/// Fields an owner may change. `None` leaves the column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

impl BlogChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.content.is_none()
            && self.image.is_none()
    }
}

/// List filters; supplied dimensions combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogFilter {
    pub category: Option<String>,
    pub author: Option<String>,
}

impl BlogFilter {
    /// Drops blank values so `?category=` means "no category filter".
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            category: keep(self.category),
            author: keep(self.author),
        }
    }
}
