use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::notification::Notifier;
use crate::services::report::{ReportService, ReportTarget};
use crate::services::user::UserService;
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub report_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatReportResponse {
    /// False when the caller had already reported this member
    pub filed: bool,
}

async fn file(
    db: DatabaseConnection,
    reporter_id: i32,
    target: ReportTarget,
    id: i32,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report_id = ReportService::new(db)
        .report(reporter_id, target, id)
        .await?;
    Ok(ApiResponse::with_message(
        ReportResponse { report_id },
        "Report sent to staff",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/report",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Report filed", body = ReportResponse),
        (status = 404, description = "Post not found", body = crate::error::AppError),
    ),
    tag = "reports"
)]
pub async fn report_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    file(db, auth_user.user_id, ReportTarget::Post, id).await
}

#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/report",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Report filed", body = ReportResponse),
        (status = 404, description = "Offer not found", body = crate::error::AppError),
    ),
    tag = "reports"
)]
pub async fn report_offer(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    file(db, auth_user.user_id, ReportTarget::Offer, id).await
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{username}/report",
    security(("jwt_token" = [])),
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Report filed", body = ReportResponse),
        (status = 400, description = "Cannot report yourself", body = crate::error::AppError),
    ),
    tag = "reports"
)]
pub async fn report_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let target = UserService::new(db.clone(), notifier)
        .get_by_username(&username)
        .await?;
    file(db, auth_user.user_id, ReportTarget::User, target.id).await
}

#[utoipa::path(
    post,
    path = "/api/v1/messages/{username}/report",
    security(("jwt_token" = [])),
    params(("username" = String, Path, description = "Conversation partner")),
    responses(
        (status = 200, description = "Chat report filed", body = ChatReportResponse),
    ),
    tag = "reports"
)]
pub async fn report_chat(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let partner = UserService::new(db.clone(), notifier)
        .get_by_username(&username)
        .await?;
    let filed = ReportService::new(db)
        .report_chat(auth_user.user_id, partner.id)
        .await?;
    Ok(ApiResponse::ok(ChatReportResponse { filed }))
}
