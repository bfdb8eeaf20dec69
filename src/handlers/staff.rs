//! Staff console. Every route here sits behind `staff_middleware`.

use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::services::moderation::StrikeOutcome;
use crate::services::notification::Notifier;
use crate::services::report::ReportTarget;
use crate::services::request::{PendingRequest, RequestKind, RequestService};
use crate::services::staff::{
    ChatReportEntry, ChatReportView, OfferReportView, PostReportView, ReportEntry, StaffHome,
    StaffService, UserReportView,
};
use crate::utils::clock::SharedClock;
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct AcceptedResponse {
    pub user_id: i32,
}

fn staff(db: DatabaseConnection, notifier: Notifier, clock: SharedClock) -> StaffService {
    StaffService::new(db, notifier, clock)
}

#[utoipa::path(
    get,
    path = "/api/v1/staff",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Queue sizes; expired strikes are cleared first", body = StaffHome),
        (status = 303, description = "Not staff; Location is /"),
    ),
    tag = "staff"
)]
pub async fn home(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).home().await?))
}

// Post reports

#[utoipa::path(
    get,
    path = "/api/v1/staff/post-reports",
    security(("jwt_token" = [])),
    responses((status = 200, description = "Open post reports, oldest first", body = Vec<ReportEntry>)),
    tag = "staff"
)]
pub async fn post_reports(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).post_reports().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/post-reports/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Reported post", body = PostReportView),
        (status = 303, description = "Report gone; Location is the queue"),
    ),
    tag = "staff"
)]
pub async fn post_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).post_report(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/post-reports/{id}/remove",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses((status = 200, description = "Post removed and author struck", body = StrikeOutcome)),
    tag = "staff"
)]
pub async fn remove_post(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).remove_post(id).await?))
}

pub async fn dismiss_post_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    staff(db, notifier, clock)
        .dismiss(ReportTarget::Post, id)
        .await?;
    Ok(ApiResponse::with_message((), "Report dismissed"))
}

// Offer reports

#[utoipa::path(
    get,
    path = "/api/v1/staff/offer-reports",
    security(("jwt_token" = [])),
    responses((status = 200, description = "Open offer reports, oldest first", body = Vec<ReportEntry>)),
    tag = "staff"
)]
pub async fn offer_reports(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).offer_reports().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/offer-reports/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Reported offer", body = OfferReportView),
        (status = 303, description = "Report gone; Location is the queue"),
    ),
    tag = "staff"
)]
pub async fn offer_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).offer_report(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/offer-reports/{id}/remove",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses((status = 200, description = "Offer removed and author struck", body = StrikeOutcome)),
    tag = "staff"
)]
pub async fn remove_offer(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).remove_offer(id).await?))
}

pub async fn dismiss_offer_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    staff(db, notifier, clock)
        .dismiss(ReportTarget::Offer, id)
        .await?;
    Ok(ApiResponse::with_message((), "Report dismissed"))
}

// User reports

#[utoipa::path(
    get,
    path = "/api/v1/staff/user-reports",
    security(("jwt_token" = [])),
    responses((status = 200, description = "Open user reports, oldest first", body = Vec<ReportEntry>)),
    tag = "staff"
)]
pub async fn user_reports(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).user_reports().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/user-reports/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Reported member's profile", body = UserReportView),
        (status = 303, description = "Report gone; Location is the queue"),
    ),
    tag = "staff"
)]
pub async fn user_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).user_report(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/user-reports/{id}/strike",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses((status = 200, description = "Member struck, report closed", body = StrikeOutcome)),
    tag = "staff"
)]
pub async fn strike_reported_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(
        staff(db, notifier, clock).strike_reported_user(id).await?,
    ))
}

pub async fn dismiss_user_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    staff(db, notifier, clock)
        .dismiss(ReportTarget::User, id)
        .await?;
    Ok(ApiResponse::with_message((), "Report dismissed"))
}

// Chat reports

#[utoipa::path(
    get,
    path = "/api/v1/staff/chat-reports",
    security(("jwt_token" = [])),
    responses((status = 200, description = "Open chat reports, oldest first", body = Vec<ChatReportEntry>)),
    tag = "staff"
)]
pub async fn chat_reports(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).chat_reports().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/chat-reports/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Conversation between the reported member and the reporter", body = ChatReportView),
        (status = 303, description = "Report gone; Location is the queue"),
    ),
    tag = "staff"
)]
pub async fn chat_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(staff(db, notifier, clock).chat_report(id).await?))
}

pub async fn strike_chat_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(
        staff(db, notifier, clock).strike_chat_user(id).await?,
    ))
}

pub async fn dismiss_chat_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(clock): Extension<SharedClock>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    staff(db, notifier, clock).dismiss_chat(id).await?;
    Ok(ApiResponse::with_message((), "Report dismissed"))
}

// Promotion requests

fn request_kind(queue: &str) -> Option<RequestKind> {
    match queue {
        "business-requests" => Some(RequestKind::Business),
        "staff-requests" => Some(RequestKind::Staff),
        _ => None,
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/{queue}",
    security(("jwt_token" = [])),
    params(("queue" = String, Path, description = "business-requests or staff-requests")),
    responses(
        (status = 200, description = "Pending requests, oldest first", body = Vec<PendingRequest>),
        (status = 404, description = "Unknown queue", body = crate::error::AppError),
    ),
    tag = "staff"
)]
pub async fn list_requests(
    Extension(db): Extension<DatabaseConnection>,
    Path(queue): Path<String>,
) -> AppResult<impl IntoResponse> {
    let kind = request_kind(&queue).ok_or(crate::error::AppError::NotFound)?;
    Ok(ApiResponse::ok(RequestService::new(db).list(kind).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/{queue}/{id}",
    security(("jwt_token" = [])),
    params(
        ("queue" = String, Path, description = "business-requests or staff-requests"),
        ("id" = i32, Path, description = "Request ID"),
    ),
    responses(
        (status = 200, description = "Pending request", body = PendingRequest),
        (status = 303, description = "Request gone; Location is the queue"),
    ),
    tag = "staff"
)]
pub async fn get_request(
    Extension(db): Extension<DatabaseConnection>,
    Path((queue, id)): Path<(String, i32)>,
) -> AppResult<impl IntoResponse> {
    let kind = request_kind(&queue).ok_or(crate::error::AppError::NotFound)?;
    Ok(ApiResponse::ok(RequestService::new(db).get(kind, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/{queue}/{id}/accept",
    security(("jwt_token" = [])),
    params(
        ("queue" = String, Path, description = "business-requests or staff-requests"),
        ("id" = i32, Path, description = "Request ID"),
    ),
    responses((status = 200, description = "Promotion granted", body = AcceptedResponse)),
    tag = "staff"
)]
pub async fn accept_request(
    Extension(db): Extension<DatabaseConnection>,
    Path((queue, id)): Path<(String, i32)>,
) -> AppResult<impl IntoResponse> {
    let kind = request_kind(&queue).ok_or(crate::error::AppError::NotFound)?;
    let user_id = RequestService::new(db).accept(kind, id).await?;
    Ok(ApiResponse::ok(AcceptedResponse { user_id }))
}

pub async fn deny_request(
    Extension(db): Extension<DatabaseConnection>,
    Path((queue, id)): Path<(String, i32)>,
) -> AppResult<impl IntoResponse> {
    let kind = request_kind(&queue).ok_or(crate::error::AppError::NotFound)?;
    RequestService::new(db).deny(kind, id).await?;
    Ok(ApiResponse::with_message((), "Request denied"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_queues_resolve_by_path() {
        assert_eq!(
            request_kind("business-requests"),
            Some(RequestKind::Business)
        );
        assert_eq!(request_kind("staff-requests"), Some(RequestKind::Staff));
        assert_eq!(request_kind("post-reports"), None);
    }
}
