use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateBlogRequest, DataResponse, UpdateBlogRequest},
    repo_types::{Blog, BlogFilter, BlogListItem},
    services,
};
use crate::{
    auth::{
        middleware::{require_auth, AuthUser},
        MessageResponse,
    },
    error::ApiError,
    extract::{ApiJson, ApiPath},
    state::AppState,
};

/// Every blog route sits behind the token gate.
pub fn blog_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/blogs", get(list_blogs).post(create_blog))
        .route(
            "/api/blogs/:id",
            get(get_blog).put(update_blog).delete(delete_blog),
        )
        .route_layer(from_fn_with_state(state, require_auth))
}

#[instrument(skip(state))]
pub async fn list_blogs(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(filter): Query<BlogFilter>,
) -> Result<Json<DataResponse<Vec<BlogListItem>>>, ApiError> {
    let data = services::list_blogs(&state, filter).await?;
    Ok(Json(DataResponse {
        message: "Blogs fetched successfully",
        data,
    }))
}

#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DataResponse<Blog>>, ApiError> {
    let data = services::get_blog(&state, id).await?;
    Ok(Json(DataResponse {
        message: "Blog fetched successfully",
        data,
    }))
}

#[instrument(skip(state, body))]
pub async fn create_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateBlogRequest>,
) -> Result<(StatusCode, Json<DataResponse<Blog>>), ApiError> {
    let draft = body.validate()?;
    let data = services::create_blog(&state, user_id, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Blog created successfully",
            data,
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn update_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateBlogRequest>,
) -> Result<Json<DataResponse<Blog>>, ApiError> {
    let changes = body.into_changes()?;
    let data = services::update_blog(&state, user_id, id, changes).await?;
    Ok(Json(DataResponse {
        message: "Blog updated successfully",
        data,
    }))
}

#[instrument(skip(state))]
pub async fn delete_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_blog(&state, user_id, id).await?;
    Ok(Json(MessageResponse::new("Blog deleted successfully")))
}
