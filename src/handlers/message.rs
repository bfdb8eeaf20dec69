use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::MessageModel;
use crate::response::ApiResponse;
use crate::services::message::{order_by_recent, Draft, MessageService, ThreadSummary};
use crate::services::notification::Notifier;
use crate::services::upload::{UploadConfig, UploadKind, UploadService};
use crate::services::user::UserService;
use axum::{
    extract::{Multipart, Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ThreadListQuery {
    /// `recent` sorts by the latest message instead of by username
    pub order: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(length(max = 5000))]
    pub body: Option<String>,
    pub image_url: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/messages",
    security(("jwt_token" = [])),
    params(ThreadListQuery),
    responses(
        (status = 200, description = "One entry per conversation partner", body = Vec<ThreadSummary>),
    ),
    tag = "messages"
)]
pub async fn list_threads(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Query(query): Query<ThreadListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut threads = MessageService::new(db, notifier)
        .thread_list(auth_user.user_id)
        .await?;
    if query.order.as_deref() == Some("recent") {
        order_by_recent(&mut threads);
    }
    Ok(ApiResponse::ok(threads))
}

#[utoipa::path(
    get,
    path = "/api/v1/messages/{username}",
    security(("jwt_token" = [])),
    params(("username" = String, Path, description = "Conversation partner")),
    responses(
        (status = 200, description = "Whole conversation, oldest first; marks what the caller received as read", body = Vec<MessageModel>),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "messages"
)]
pub async fn get_conversation(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let partner = UserService::new(db.clone(), notifier.clone())
        .get_by_username(&username)
        .await?;
    let messages: Vec<MessageModel> = MessageService::new(db, notifier)
        .get_all_messages(partner.id, auth_user.user_id)
        .await?;
    Ok(ApiResponse::ok(messages))
}

async fn deliver(
    db: DatabaseConnection,
    notifier: Notifier,
    sender_id: i32,
    username: &str,
    draft: Draft,
) -> AppResult<ApiResponse<MessageModel>> {
    let users = UserService::new(db.clone(), notifier.clone());
    let sender = users.get_by_id(sender_id).await?;
    let recipient = users.get_by_username(username).await?;

    let saved = MessageService::new(db, notifier)
        .send_from_member(&sender, &recipient, draft)
        .await?;
    Ok(ApiResponse::ok(saved))
}

#[utoipa::path(
    post,
    path = "/api/v1/messages/{username}",
    security(("jwt_token" = [])),
    params(("username" = String, Path, description = "Recipient")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message sent", body = MessageModel),
        (status = 303, description = "A block exists; Location is the conversation"),
        (status = 400, description = "Empty message", body = AppError),
    ),
    tag = "messages"
)]
pub async fn send_message(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(username): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let draft = Draft {
        body: payload.body,
        image_url: payload.image_url,
    };
    deliver(db, notifier, auth_user.user_id, &username, draft).await
}

/// Send an image as a message (multipart form: field "file").
pub async fn send_image(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    Path(username): Path<String>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let recipient = UserService::new(db.clone(), notifier.clone())
        .get_by_username(&username)
        .await?;
    let (data, content_type) = super::upload::read_file(&mut multipart).await?;
    let url = UploadService::save_file(
        &config,
        &data,
        &content_type,
        UploadKind::MessageImage,
        &[auth_user.user_id, recipient.id],
    )
    .await?;

    let draft = Draft {
        body: None,
        image_url: Some(url),
    };
    deliver(db, notifier, auth_user.user_id, &username, draft).await
}
