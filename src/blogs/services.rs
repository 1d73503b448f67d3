use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::BlogDraft,
    repo_types::{Blog, BlogChanges, BlogFilter, BlogListItem, NewBlog},
};
use crate::{error::ApiError, state::AppState};

const BLOG_NOT_FOUND: &str = "Blog not found";

pub async fn list_blogs(st: &AppState, filter: BlogFilter) -> Result<Vec<BlogListItem>, ApiError> {
    st.blogs
        .list(&filter.normalized())
        .await
        .map_err(|e| ApiError::internal("Error fetching blogs", e))
}

pub async fn get_blog(st: &AppState, id: Uuid) -> Result<Blog, ApiError> {
    st.blogs
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal("Error fetching blog", e))?
        .ok_or_else(|| ApiError::NotFound(BLOG_NOT_FOUND.into()))
}

/// Creates a blog owned by `caller`, copying the caller's current name as author.
pub async fn create_blog(st: &AppState, caller: Uuid, draft: BlogDraft) -> Result<Blog, ApiError> {
    let user = st
        .users
        .find_by_id(caller)
        .await
        .map_err(|e| ApiError::internal("Error creating blog", e))?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let blog = st
        .blogs
        .create(NewBlog {
            user_id: user.id,
            author: user.name,
            title: draft.title,
            category: draft.category,
            content: draft.content,
            image: draft.image,
        })
        .await
        .map_err(|e| ApiError::internal("Error creating blog", e))?;

    info!(blog_id = %blog.id, user_id = %caller, "blog created");
    Ok(blog)
}

pub fn ensure_owner(blog: &Blog, caller: Uuid) -> Result<(), ApiError> {
    if blog.user_id != caller {
        warn!(blog_id = %blog.id, owner = %blog.user_id, %caller, "ownership check failed");
        return Err(ApiError::Forbidden(
            "You are not allowed to modify this blog".into(),
        ));
    }
    Ok(())
}

/// Resolves the blog and checks ownership. Must run before any write.
async fn owned_blog(st: &AppState, id: Uuid, caller: Uuid) -> Result<Blog, ApiError> {
    let blog = get_blog(st, id).await?;
    ensure_owner(&blog, caller)?;
    Ok(blog)
}

pub async fn update_blog(
    st: &AppState,
    caller: Uuid,
    id: Uuid,
    changes: BlogChanges,
) -> Result<Blog, ApiError> {
    owned_blog(st, id, caller).await?;

    // The write is owner-scoped too; None means the blog vanished in between.
    let blog = st
        .blogs
        .update_owned(id, caller, &changes)
        .await
        .map_err(|e| ApiError::internal("Error updating blog", e))?
        .ok_or_else(|| ApiError::NotFound(BLOG_NOT_FOUND.into()))?;

    info!(blog_id = %id, user_id = %caller, "blog updated");
    Ok(blog)
}

pub async fn delete_blog(st: &AppState, caller: Uuid, id: Uuid) -> Result<(), ApiError> {
    owned_blog(st, id, caller).await?;

    let deleted = st
        .blogs
        .delete_owned(id, caller)
        .await
        .map_err(|e| ApiError::internal("Error deleting blog", e))?;
    if !deleted {
        return Err(ApiError::NotFound(BLOG_NOT_FOUND.into()));
    }

    info!(blog_id = %id, user_id = %caller, "blog deleted");
    Ok(())
}
