use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::NotificationModel;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::notification::{NotificationService, Notifier};
use crate::services::user::UserService;
use axum::{extract::Query, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub link: Option<String>,
    pub created_at: String,
}

impl From<NotificationModel> for NotificationResponse {
    fn from(n: NotificationModel) -> Self {
        Self {
            id: n.id,
            title: n.title,
            content: n.content,
            link: n.link,
            created_at: n.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StrikesResponse {
    pub strikes: i32,
    /// When the current strikes expire
    pub strike_date: String,
    /// Admins to contact about a suspension
    pub admins: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    security(("jwt_token" = [])),
    params(PaginationQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = PaginatedResponse<NotificationResponse>),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = params.resolve();

    let service = NotificationService::new(db, notifier);
    let (notifications, total) = service
        .list_for_user(auth_user.user_id, page, per_page)
        .await?;
    let items = notifications
        .into_iter()
        .map(NotificationResponse::from)
        .collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/strikes",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Caller's strike status", body = StrikesResponse),
    ),
    tag = "notifications"
)]
pub async fn strikes(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let profile = UserService::new(db.clone(), notifier.clone())
        .profile_of(auth_user.user_id)
        .await?;
    let admins = NotificationService::new(db, notifier)
        .admin_usernames()
        .await?;

    Ok(ApiResponse::ok(StrikesResponse {
        strikes: profile.strikes,
        strike_date: profile.strike_date.to_string(),
        admins,
    }))
}
