use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::notification::Notifier;
use crate::services::relationship::RelationshipService;
use crate::services::user::{MemberCard, UserService};
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct FollowToggleResponse {
    pub following: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlockToggleResponse {
    pub blocking: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{username}/follow",
    security(("jwt_token" = [])),
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Follow state after the toggle", body = FollowToggleResponse),
        (status = 400, description = "Cannot follow yourself", body = crate::error::AppError),
    ),
    tag = "relationships"
)]
pub async fn toggle_follow(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let users = UserService::new(db.clone(), notifier.clone());
    let caller = users.get_by_id(auth_user.user_id).await?;
    let target = users.get_by_username(&username).await?;

    let following = RelationshipService::new(db, notifier)
        .toggle_follow(&caller, &target)
        .await?;
    Ok(ApiResponse::ok(FollowToggleResponse { following }))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{username}/block",
    security(("jwt_token" = [])),
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Block state after the toggle", body = BlockToggleResponse),
        (status = 400, description = "Cannot block yourself", body = crate::error::AppError),
    ),
    tag = "relationships"
)]
pub async fn toggle_block(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let users = UserService::new(db.clone(), notifier.clone());
    let caller = users.get_by_id(auth_user.user_id).await?;
    let target = users.get_by_username(&username).await?;

    let blocking = RelationshipService::new(db, notifier)
        .toggle_block(&caller, &target)
        .await?;
    Ok(ApiResponse::ok(BlockToggleResponse { blocking }))
}

pub async fn list_followers(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Path(username): Path<String>,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = params.resolve();
    let users = UserService::new(db.clone(), notifier.clone());
    let owner = users.get_by_username(&username).await?;

    let (followers, total) = RelationshipService::new(db, notifier)
        .list_followers(owner.id, page, per_page)
        .await?;
    let items: Vec<MemberCard> = users.cards(followers).await?;
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

pub async fn list_following(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Path(username): Path<String>,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = params.resolve();
    let users = UserService::new(db.clone(), notifier.clone());
    let owner = users.get_by_username(&username).await?;

    let (following, total) = RelationshipService::new(db, notifier)
        .list_following(owner.id, page, per_page)
        .await?;
    let items: Vec<MemberCard> = users.cards(following).await?;
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

/// Members the caller currently blocks.
pub async fn list_blocked(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let blocked = RelationshipService::new(db.clone(), notifier.clone())
        .list_blocked(auth_user.user_id)
        .await?;
    let cards = UserService::new(db, notifier).cards(blocked).await?;
    Ok(ApiResponse::ok(cards))
}
