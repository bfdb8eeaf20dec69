use crate::error::{AppError, AppResult};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::notification::Notifier;
use crate::services::post::{NewPost, PostDetail, PostService, PostView};
use crate::services::user::UserService;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    /// Post content (Markdown supported)
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    /// Uploaded image path from `/upload/image`
    pub image_url: Option<String>,
    /// Space separated topics, e.g. "rust jobs"
    #[serde(default)]
    #[validate(length(max = 200))]
    pub topics: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes: u64,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Live top-level posts, newest first", body = PaginatedResponse<PostView>),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = params.resolve();
    let (items, total) = PostService::new(db, notifier)
        .feed(page, per_page)
        .await?;
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetail),
        (status = 303, description = "Missing, removed or blocked; Location is the feed"),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let detail = PostService::new(db, notifier).detail(viewer, id).await?;
    Ok(ApiResponse::ok(detail))
}

async fn publish(
    db: DatabaseConnection,
    notifier: Notifier,
    user_id: i32,
    payload: CreatePostRequest,
    parent_id: Option<i32>,
) -> AppResult<ApiResponse<PostView>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let author = UserService::new(db.clone(), notifier.clone())
        .get_by_id(user_id)
        .await?;
    let service = PostService::new(db, notifier);
    let post = service
        .create(
            &author,
            NewPost {
                content: payload.content,
                image_url: payload.image_url,
                topics: payload.topics,
                parent_id,
            },
        )
        .await?
        .into_result()?;

    let view = service.find_view(post.id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(view))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    security(("jwt_token" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post published", body = PostView),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Posting is disabled while you have active strikes", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    publish(db, notifier, auth_user.user_id, payload, None).await
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/comments",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Parent post ID")),
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Comment published", body = PostView),
        (status = 303, description = "Parent missing or blocked; Location is the feed"),
        (status = 403, description = "Posting is disabled while you have active strikes", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_comment(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    publish(db, notifier, auth_user.user_id, payload, Some(id)).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 303, description = "Not the author; Location is the post"),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    PostService::new(db, notifier)
        .delete(auth_user.user_id, id)
        .await?;
    Ok(ApiResponse::with_message((), "Post deleted"))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/like",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeResponse),
        (status = 403, description = "Suspended members cannot like", body = AppError),
    ),
    tag = "posts"
)]
pub async fn like_post(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let (liked, likes) = PostService::new(db, notifier)
        .toggle_like(auth_user.user_id, id)
        .await?;
    Ok(ApiResponse::ok(LikeResponse { liked, likes }))
}
