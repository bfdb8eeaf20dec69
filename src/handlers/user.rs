use crate::error::{AppError, AppResult};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::notification::Notifier;
use crate::services::request::{RequestKind, RequestService};
use crate::services::user::{MemberCard, ProfilePage, ProfileUpdate, UserService};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub bio: Option<String>,
    /// Public website, shown on business profiles
    #[validate(url)]
    pub domain: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub bio: Option<String>,
    pub domain: String,
    pub avatar_url: Option<String>,
    pub cv_url: Option<String>,
    pub is_business: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestFiledResponse {
    /// False when a request was already pending
    pub filed: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Profile page", body = ProfilePage),
        (status = 303, description = "Owner blocked the caller; Location is the caller's own page"),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_user_profile(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let page = UserService::new(db, notifier)
        .profile_page(viewer, &username)
        .await?;
    Ok(ApiResponse::ok(page))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    security(("jwt_token" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Validation error", body = AppError),
    ),
    tag = "users"
)]
pub async fn update_profile(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = UserService::new(db, notifier)
        .update_profile(
            auth_user.user_id,
            ProfileUpdate {
                bio: payload.bio,
                domain: payload.domain,
                ..Default::default()
            },
        )
        .await?;

    Ok(ApiResponse::ok(ProfileResponse {
        bio: profile.bio,
        domain: profile.domain,
        avatar_url: profile.avatar_url,
        cv_url: profile.cv_url,
        is_business: profile.is_business,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    security(("jwt_token" = [])),
    params(PaginationQuery),
    responses(
        (status = 200, description = "Everyone but the caller, by username", body = PaginatedResponse<MemberCard>),
    ),
    tag = "users"
)]
pub async fn directory(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = params.resolve();
    let (items, total) = UserService::new(db, notifier)
        .directory(auth_user.user_id, page, per_page)
        .await?;
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

async fn file_request(
    db: DatabaseConnection,
    notifier: Notifier,
    user_id: i32,
    kind: RequestKind,
) -> AppResult<ApiResponse<RequestFiledResponse>> {
    let member = UserService::new(db.clone(), notifier).get_by_id(user_id).await?;
    let filed = RequestService::new(db).file(&member, kind).await?;
    Ok(ApiResponse::ok(RequestFiledResponse { filed }))
}

#[utoipa::path(
    post,
    path = "/api/v1/requests/business",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Business request filed", body = RequestFiledResponse),
        (status = 409, description = "Already a business account", body = AppError),
    ),
    tag = "users"
)]
pub async fn request_business(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    file_request(db, notifier, auth_user.user_id, RequestKind::Business).await
}

#[utoipa::path(
    post,
    path = "/api/v1/requests/staff",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Staff request filed", body = RequestFiledResponse),
        (status = 409, description = "Already staff", body = AppError),
    ),
    tag = "users"
)]
pub async fn request_staff(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    file_request(db, notifier, auth_user.user_id, RequestKind::Staff).await
}
